//! HTTP API request and response types.

use queue_core::{Job, JobId, JobOutcome, Priority};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ApiError, ApiResult};

/// Longest a long-polling dequeue may wait.
pub const MAX_WAIT_MS: u64 = 30_000;

/// Request body for enqueueing a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub agent: String,
    pub model: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub payload: Option<JsonValue>,
    #[serde(default)]
    pub id: Option<String>,
}

impl EnqueueRequest {
    /// Validate the request and build the job to store.
    ///
    /// A missing priority or any unrecognised label means low priority.
    pub fn into_job(self) -> ApiResult<Job> {
        if self.agent.is_empty() {
            return Err(ApiError::BadRequest("agent must not be empty".into()));
        }

        let priority = self
            .priority
            .as_deref()
            .map(Priority::from_label)
            .unwrap_or_default();

        let mut job = Job::new(self.agent, self.model)
            .with_id(JobId::or_generate(self.id))
            .with_priority(priority);
        if let Some(payload) = self.payload.filter(|p| !p.is_null()) {
            job = job.with_payload(payload);
        }
        Ok(job)
    }
}

/// Response to an enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    pub id: JobId,
}

/// Request body for completing a job. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CompleteRequest {
    /// Missing status means success; anything but `"ok"` is a failure.
    pub fn into_outcome(self) -> JobOutcome {
        JobOutcome::from_status(self.status.as_deref().unwrap_or("ok"), self.error)
    }
}

/// Query string carrying the agent a request is scoped to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentQuery {
    #[serde(default)]
    pub agent: Option<String>,
}

impl AgentQuery {
    pub fn require_agent(self) -> ApiResult<String> {
        require_agent(self.agent)
    }
}

/// Query string for dequeue, with an optional long-poll wait.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DequeueQuery {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub wait_ms: Option<u64>,
}

fn require_agent(agent: Option<String>) -> ApiResult<String> {
    agent
        .filter(|a| !a.is_empty())
        .ok_or(ApiError::MissingAgent)
}

impl DequeueQuery {
    pub fn require_agent(&self) -> ApiResult<String> {
        require_agent(self.agent.clone())
    }
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Number of queued jobs removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

/// Response to a stop: the agent is paused and its queued jobs removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopResponse {
    pub ok: bool,
    pub paused: bool,
    pub removed: usize,
}
