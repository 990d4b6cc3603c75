//! HTTP client for the queue service.

use queue_core::{Job, JobId, JobOutcome, Priority};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors talking to the queue service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Queue returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// A job a producer wants queued.
#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub agent: String,
    pub model: String,
    pub priority: Priority,
    pub payload: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NewJob {
    pub fn new(agent: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            model: model.into(),
            priority: Priority::Low,
            payload: JsonValue::Object(Default::default()),
            id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Deserialize)]
struct EnqueueResponse {
    id: JobId,
}

/// Client for the queue's agent-facing endpoints.
#[derive(Debug, Clone)]
pub struct QueueClient {
    http: reqwest::Client,
    base_url: String,
}

impl QueueClient {
    /// Create a client for the queue at `base_url`, e.g. `http://localhost:7000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into an error carrying its body.
    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// Queue a job and return its id.
    pub async fn enqueue(&self, job: &NewJob) -> ClientResult<JobId> {
        let response = self.http.post(self.url("/enqueue")).json(job).send().await?;
        let created: EnqueueResponse = Self::check(response).await?.json().await?;
        Ok(created.id)
    }

    /// Poll once for the agent's next job. `None` means no work right now.
    pub async fn dequeue(&self, agent: &str) -> ClientResult<Option<Job>> {
        let response = self
            .http
            .get(self.url("/dequeue"))
            .query(&[("agent", agent)])
            .send()
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let job = Self::check(response).await?.json().await?;
        Ok(Some(job))
    }

    /// Report that a job finished.
    pub async fn complete(&self, id: &JobId, outcome: &JobOutcome) -> ClientResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/complete/{}", id)))
            .json(outcome)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
