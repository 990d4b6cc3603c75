//! HTTP API for the job queue.
//!
//! This crate maps the queue's operations onto HTTP:
//! - Data plane (enqueue, dequeue, complete)
//! - Read-only views (stats, peek, control state)
//! - Control plane (pause, resume, skip, bring forward, cancel, stop)
//! - Real-time events (SSE streaming)
//!
//! Input validation happens here; the queue actor only ever sees
//! well-formed requests.

mod control;
mod error;
mod jobs;
mod realtime;
pub mod types;

use actors::QueueHandle;
use axum::Json;
use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{delete, get, post};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use realtime::sse_event;

/// Shared application state.
pub type AppState = QueueHandle;

/// Build the router for the full wire contract.
pub fn create_router(queue: QueueHandle) -> Router {
    Router::new()
        .route("/health", get(jobs::health))
        .route("/enqueue", post(jobs::enqueue))
        .route("/dequeue", get(jobs::dequeue))
        .route("/complete/", post(jobs::complete_without_id))
        .route("/complete/{id}", post(jobs::complete))
        .route("/stats", get(jobs::stats))
        .route("/peek", get(jobs::peek))
        .route("/jobs", delete(control::cancel_queued))
        .route("/control/pause", post(control::pause))
        .route("/control/resume", post(control::resume))
        .route("/control/state", get(control::state))
        .route("/control/skip_next", post(control::skip_next))
        .route("/control/bring_forward", post(control::bring_forward))
        .route("/control/stop", post(control::stop))
        .route("/events", get(realtime::events))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(queue)
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

/// CORS for browser dashboards.
///
/// An empty list, or a list containing `*`, allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
