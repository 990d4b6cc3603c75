//! Error responses for the HTTP API.

use actors::ActorError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use queue_core::JobId;
use serde_json::json;

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned to HTTP callers as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A delivery or control operation arrived without an agent name.
    #[error("agent query parameter required")]
    MissingAgent,

    /// The request body could not be decoded or failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// A job with the requested id is already queued or inflight.
    #[error("job id {0} already queued or inflight")]
    DuplicateId(JobId),

    /// The queue actor is not reachable.
    #[error("queue unavailable: {0}")]
    Queue(#[from] ActorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAgent | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateId(_) => StatusCode::CONFLICT,
            ApiError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("invalid JSON body: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
