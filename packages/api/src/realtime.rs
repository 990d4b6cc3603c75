//! Real-time event streaming via Server-Sent Events.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use futures_util::stream;
use queue_core::JobEvent;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

/// Format an event for SSE: the event tag as the SSE event name, JSON as data.
pub fn sse_event(event: &JobEvent) -> Event {
    let json = serde_json::to_value(event).unwrap_or_default();
    let name = json
        .get("event")
        .and_then(|v| v.as_str())
        .unwrap_or("message")
        .to_string();
    Event::default().event(name).data(json.to_string())
}

/// `GET /events`
///
/// A subscriber that falls behind skips the events it missed rather than
/// disconnecting.
pub async fn events(
    State(queue): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = queue.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((Ok(sse_event(&event)), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event stream subscriber lagged by {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
