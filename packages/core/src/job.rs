//! Job domain types for work items routed to agents.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a job.
///
/// Producers may supply their own identifier; when they don't, one is
/// generated from a ULID so engine-assigned ids sort chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Use a caller-supplied id, generating one if it is empty.
    pub fn or_generate(id: Option<String>) -> Self {
        match id {
            Some(id) if !id.is_empty() => Self(id),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Priority class of a job, which also names the lane it waits in.
///
/// Only `"high"` selects the high lane. Anything else, including an
/// unrecognised label, is treated as low priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    High,
    #[default]
    Low,
}

impl Priority {
    /// Map a priority label, falling back to `Low` for anything unknown.
    pub fn from_label(label: &str) -> Self {
        if label == "high" { Priority::High } else { Priority::Low }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Low => "low",
        }
    }
}

impl From<String> for Priority {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome reported by an agent when it completes a job.
///
/// The engine accepts it and drops it; it only exists so callers can log
/// and forward it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobOutcome {
    #[default]
    Ok,
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl JobOutcome {
    /// Build an outcome from a wire status label. Only `"ok"` is a success.
    pub fn from_status(status: &str, error: Option<String>) -> Self {
        if status == "ok" {
            JobOutcome::Ok
        } else {
            JobOutcome::Error { error }
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        JobOutcome::Error {
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, JobOutcome::Ok)
    }
}

/// A unit of work addressed to a named agent.
///
/// Jobs are immutable once enqueued; only their location in the queue
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier for this job.
    pub id: JobId,
    /// Name of the agent that should process it.
    pub agent: String,
    /// Model identifier passed through to the agent untouched.
    pub model: String,
    /// Priority class, selecting the lane.
    #[serde(default)]
    pub priority: Priority,
    /// Agent-specific payload. Never interpreted by the queue.
    #[serde(default = "empty_payload")]
    pub payload: serde_json::Value,
}

fn empty_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Job {
    /// Create a low priority job with an empty payload and a fresh id.
    pub fn new(agent: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            agent: agent.into(),
            model: model.into(),
            priority: Priority::default(),
            payload: empty_payload(),
        }
    }

    /// Set the id for this job.
    pub fn with_id(mut self, id: impl Into<JobId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the priority for this job.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the payload for this job.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
