//! Event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{Lane, MovedJob};
use crate::job::{Job, JobId, JobOutcome};

/// Events emitted whenever the queue changes state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    // Data plane
    /// A job was appended to a lane.
    JobEnqueued { job: Job, timestamp: DateTime<Utc> },
    /// A job was handed to an agent and is now inflight.
    JobDequeued {
        job_id: JobId,
        agent: String,
        timestamp: DateTime<Utc>,
    },
    /// An agent reported a job finished.
    JobCompleted {
        job_id: JobId,
        agent: String,
        outcome: JobOutcome,
        timestamp: DateTime<Utc>,
    },

    // Control plane
    /// An agent's next job was sent to the back of its lane.
    JobSkipped {
        job_id: JobId,
        agent: String,
        lane: Lane,
        timestamp: DateTime<Utc>,
    },
    /// An agent's next job was moved to the front of the high lane.
    JobBroughtForward {
        job_id: JobId,
        agent: String,
        from: Lane,
        timestamp: DateTime<Utc>,
    },
    /// Queued jobs for an agent were removed.
    JobsCancelled {
        agent: String,
        removed: usize,
        timestamp: DateTime<Utc>,
    },
    AgentPaused {
        agent: String,
        timestamp: DateTime<Utc>,
    },
    AgentResumed {
        agent: String,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn skipped(agent: &str, moved: &MovedJob) -> Self {
        JobEvent::JobSkipped {
            job_id: moved.id.clone(),
            agent: agent.to_string(),
            lane: moved.from,
            timestamp: Utc::now(),
        }
    }

    pub fn brought_forward(agent: &str, moved: &MovedJob) -> Self {
        JobEvent::JobBroughtForward {
            job_id: moved.id.clone(),
            agent: agent.to_string(),
            from: moved.from,
            timestamp: Utc::now(),
        }
    }

    /// Agent the event concerns.
    pub fn agent(&self) -> &str {
        match self {
            JobEvent::JobEnqueued { job, .. } => &job.agent,
            JobEvent::JobDequeued { agent, .. }
            | JobEvent::JobCompleted { agent, .. }
            | JobEvent::JobSkipped { agent, .. }
            | JobEvent::JobBroughtForward { agent, .. }
            | JobEvent::JobsCancelled { agent, .. }
            | JobEvent::AgentPaused { agent, .. }
            | JobEvent::AgentResumed { agent, .. } => agent,
        }
    }

    /// Get the job ID associated with this event, if any.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            JobEvent::JobEnqueued { job, .. } => Some(&job.id),
            JobEvent::JobDequeued { job_id, .. }
            | JobEvent::JobCompleted { job_id, .. }
            | JobEvent::JobSkipped { job_id, .. }
            | JobEvent::JobBroughtForward { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// Whether this event may have made a job deliverable to its agent.
    ///
    /// Long-polling dequeues wait for one of these before retrying.
    pub fn may_unblock(&self) -> bool {
        matches!(
            self,
            JobEvent::JobEnqueued { .. } | JobEvent::AgentResumed { .. }
        )
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::JobEnqueued { job, .. } => {
                format!("Job {} enqueued for {} ({})", job.id, job.agent, job.priority)
            }
            JobEvent::JobDequeued { job_id, agent, .. } => {
                format!("Job {} dequeued by {}", job_id, agent)
            }
            JobEvent::JobCompleted {
                job_id, outcome, ..
            } => match outcome {
                JobOutcome::Ok => format!("Job {} completed", job_id),
                JobOutcome::Error { error } => format!(
                    "Job {} failed: {}",
                    job_id,
                    error.as_deref().unwrap_or("no detail")
                ),
            },
            JobEvent::JobSkipped { job_id, lane, .. } => {
                format!("Job {} skipped to back of {} lane", job_id, lane)
            }
            JobEvent::JobBroughtForward { job_id, from, .. } => {
                format!("Job {} brought forward from {} lane", job_id, from)
            }
            JobEvent::JobsCancelled { agent, removed, .. } => {
                format!("Cancelled {} queued jobs for {}", removed, agent)
            }
            JobEvent::AgentPaused { agent, .. } => format!("Agent {} paused", agent),
            JobEvent::AgentResumed { agent, .. } => format!("Agent {} resumed", agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_tagged() {
        let event = JobEvent::AgentPaused {
            agent: "rag".into(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], json!("agent_paused"));
        assert_eq!(value["agent"], json!("rag"));
        assert!(!event.may_unblock());
        assert_eq!(event.job_id(), None);
    }

    #[test]
    fn enqueue_event_unblocks_its_agent() {
        let job = Job::new("rag", "m").with_id("j1");
        let event = JobEvent::JobEnqueued {
            job,
            timestamp: Utc::now(),
        };
        assert!(event.may_unblock());
        assert_eq!(event.agent(), "rag");
        assert_eq!(event.job_id().map(JobId::as_str), Some("j1"));
        assert_eq!(event.description(), "Job j1 enqueued for rag (low)");
    }
}
