//! Control-plane handlers scoped to one agent.

use axum::Json;
use axum::extract::{Query, State};
use queue_core::ControlState;

use crate::AppState;
use crate::error::ApiResult;
use crate::types::{AckResponse, AgentQuery, RemovedResponse, StopResponse};

/// `POST /control/pause?agent=NAME`
pub async fn pause(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<AckResponse>> {
    let agent = query.require_agent()?;
    if queue.pause(&agent).await? {
        tracing::info!("Paused agent {}", agent);
    }
    Ok(Json(AckResponse { ok: true }))
}

/// `POST /control/resume?agent=NAME`
pub async fn resume(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<AckResponse>> {
    let agent = query.require_agent()?;
    if queue.resume(&agent).await? {
        tracing::info!("Resumed agent {}", agent);
    }
    Ok(Json(AckResponse { ok: true }))
}

/// `GET /control/state`
pub async fn state(State(queue): State<AppState>) -> ApiResult<Json<ControlState>> {
    Ok(Json(queue.control_state().await?))
}

/// `DELETE /jobs?agent=NAME`
///
/// Removes queued jobs only; inflight jobs can't be cancelled.
pub async fn cancel_queued(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<RemovedResponse>> {
    let agent = query.require_agent()?;
    let removed = queue.cancel_queued(&agent).await?;
    tracing::info!("Cancelled {} queued jobs for {}", removed, agent);
    Ok(Json(RemovedResponse { removed }))
}

/// `POST /control/skip_next?agent=NAME`
pub async fn skip_next(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<AckResponse>> {
    let agent = query.require_agent()?;
    let moved = queue.skip_next(&agent).await?;
    Ok(Json(AckResponse {
        ok: moved.is_some(),
    }))
}

/// `POST /control/bring_forward?agent=NAME`
pub async fn bring_forward(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<AckResponse>> {
    let agent = query.require_agent()?;
    let moved = queue.bring_forward(&agent).await?;
    Ok(Json(AckResponse {
        ok: moved.is_some(),
    }))
}

/// `POST /control/stop?agent=NAME`
pub async fn stop(
    State(queue): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<StopResponse>> {
    let agent = query.require_agent()?;
    let removed = queue.stop(&agent).await?;
    tracing::info!("Stopped agent {} ({} queued jobs removed)", agent, removed);
    Ok(Json(StopResponse {
        ok: true,
        paused: true,
        removed,
    }))
}
