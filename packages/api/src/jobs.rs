//! Data-plane handlers: enqueue, dequeue, complete, plus the read-only views.

use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::types::{
    AckResponse, AgentQuery, CompleteRequest, DequeueQuery, EnqueueRequest, EnqueueResponse,
    MAX_WAIT_MS,
};
use crate::AppState;

/// Decode a JSON body, treating an empty body as the type's default.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Either a JSON body or `204 No Content`.
fn json_or_no_content<T: serde::Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `POST /enqueue`
pub async fn enqueue(State(queue): State<AppState>, body: Bytes) -> ApiResult<Json<EnqueueResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("request body required".into()));
    }
    let request: EnqueueRequest = serde_json::from_slice(&body)?;
    let job = request.into_job()?;
    let id = job.id.clone();
    let stored = queue.enqueue(job).await?.ok_or(ApiError::DuplicateId(id))?;
    Ok(Json(EnqueueResponse { id: stored.id }))
}

/// `GET /dequeue?agent=NAME[&wait_ms=N]`
///
/// Without `wait_ms` this is a non-blocking poll.
pub async fn dequeue(
    State(queue): State<AppState>,
    Query(query): Query<DequeueQuery>,
) -> ApiResult<Response> {
    let agent = query.require_agent()?;
    let job = match query.wait_ms.filter(|ms| *ms > 0) {
        Some(ms) => {
            let wait = Duration::from_millis(ms.min(MAX_WAIT_MS));
            queue.dequeue_wait(&agent, wait).await?
        }
        None => queue.dequeue(&agent).await?,
    };
    Ok(json_or_no_content(job))
}

/// `POST /complete/{id}`
pub async fn complete(
    State(queue): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<AckResponse>> {
    let request: CompleteRequest = parse_optional_body(&body)?;
    let outcome = request.into_outcome();
    if let queue_core::JobOutcome::Error { error } = &outcome {
        tracing::info!(
            "Job {} reported failure: {}",
            id,
            error.as_deref().unwrap_or("no detail")
        );
    }
    queue.complete(id.into(), outcome).await?;
    Ok(Json(AckResponse { ok: true }))
}

/// `POST /complete/` with the id segment left empty.
pub async fn complete_without_id() -> ApiError {
    ApiError::BadRequest("id required".into())
}

/// `GET /stats`
pub async fn stats(State(queue): State<AppState>) -> ApiResult<Json<queue_core::QueueStats>> {
    let snapshot = queue.snapshot().await?;
    Ok(Json(snapshot.into_stats()))
}

/// `GET /peek?agent=NAME`
pub async fn peek(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Response> {
    let agent = query.require_agent()?;
    Ok(json_or_no_content(queue.peek(&agent).await?))
}

/// `GET /health`
pub async fn health() -> Json<AckResponse> {
    Json(AckResponse { ok: true })
}
