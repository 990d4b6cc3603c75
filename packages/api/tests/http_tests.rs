#![allow(clippy::disallowed_methods)]

use std::error::Error;
use std::time::Duration;

use actors::{DEFAULT_EVENT_CAPACITY, start_queue};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn Error>>;

async fn app() -> Result<Router, Box<dyn Error>> {
    let (queue, _join) = start_queue(DEFAULT_EVENT_CAPACITY).await?;
    Ok(api::create_router(queue))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), Box<dyn Error>> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

async fn enqueue(app: &Router, body: Value) -> Result<String, Box<dyn Error>> {
    let (status, json) = send(app, Method::POST, "/enqueue", Some(body)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(json["id"].as_str().ok_or("missing id")?.to_string())
}

#[tokio::test]
async fn test_health_endpoint() -> TestResult {
    let app = app().await?;
    let (status, json) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"ok": true}));
    Ok(())
}

#[tokio::test]
async fn test_enqueue_dequeue_complete() -> TestResult {
    let app = app().await?;

    let id = enqueue(
        &app,
        json!({"agent": "rag", "model": "llama3", "payload": {"query": "hi"}}),
    )
    .await?;
    assert!(!id.is_empty());

    let (status, job) = send(&app, Method::GET, "/dequeue?agent=rag", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        job,
        json!({
            "id": id,
            "agent": "rag",
            "model": "llama3",
            "priority": "low",
            "payload": {"query": "hi"}
        })
    );

    let (status, _) = send(&app, Method::GET, "/dequeue?agent=rag", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uri = format!("/complete/{id}");
    let (status, ack) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"status": "error", "error": "model offline"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({"ok": true}));

    // A repeated completion is acknowledged too.
    let (status, _) = send(&app, Method::POST, &uri, None).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    assert_eq!(stats["metrics"]["inflight"], json!(0));

    Ok(())
}

#[tokio::test]
async fn test_enqueue_validation() -> TestResult {
    let app = app().await?;

    let (status, json) = send(&app, Method::POST, "/enqueue", Some(json!({"model": "m"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/enqueue", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = enqueue(
        &app,
        json!({"agent": "a", "model": "m", "priority": "urgent", "id": "given"}),
    )
    .await?;
    assert_eq!(id, "given");

    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    assert_eq!(stats["metrics"]["queued_low"], json!(1));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() -> TestResult {
    let app = app().await?;
    enqueue(&app, json!({"agent": "a", "model": "m", "id": "x"})).await?;

    let body = json!({"agent": "b", "model": "m", "priority": "high", "id": "x"});
    let (status, json) = send(&app, Method::POST, "/enqueue", Some(body.clone())).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].is_string());

    // Still rejected while the first job is inflight
    let (_, job) = send(&app, Method::GET, "/dequeue?agent=a", None).await?;
    assert_eq!(job["agent"], json!("a"));
    let (status, _) = send(&app, Method::POST, "/enqueue", Some(body.clone())).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    assert_eq!(stats["inflight"][0]["agent"], json!("a"));
    assert_eq!(stats["metrics"]["queued_high"], json!(0));

    // Free again once completed
    send(&app, Method::POST, "/complete/x", None).await?;
    assert_eq!(enqueue(&app, body).await?, "x");

    Ok(())
}

#[tokio::test]
async fn test_complete_requires_id() -> TestResult {
    let app = app().await?;
    let (status, json) = send(&app, Method::POST, "/complete/", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "id required"}));
    Ok(())
}

#[tokio::test]
async fn test_agent_is_required() -> TestResult {
    let app = app().await?;

    for (method, uri) in [
        (Method::GET, "/dequeue"),
        (Method::GET, "/dequeue?agent="),
        (Method::GET, "/peek"),
        (Method::POST, "/control/pause"),
        (Method::POST, "/control/resume"),
        (Method::POST, "/control/skip_next"),
        (Method::POST, "/control/bring_forward"),
        (Method::POST, "/control/stop"),
        (Method::DELETE, "/jobs"),
    ] {
        let (status, json) = send(&app, method, uri, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json, json!({"error": "agent query parameter required"}));
    }

    Ok(())
}

#[tokio::test]
async fn test_pause_resume_and_state() -> TestResult {
    let app = app().await?;

    let (status, _) = send(&app, Method::POST, "/control/pause?agent=seo", None).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, state) = send(&app, Method::GET, "/control/state", None).await?;
    assert_eq!(state, json!({"paused": ["seo"]}));

    let id = enqueue(&app, json!({"agent": "seo", "model": "m", "priority": "high"})).await?;
    let (status, _) = send(&app, Method::GET, "/dequeue?agent=seo", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, peek) = send(&app, Method::GET, "/peek?agent=seo", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(peek["job"]["id"], json!(id));
    assert_eq!(peek["lane"], json!("high"));
    assert_eq!(peek["position"], json!(0));

    send(&app, Method::POST, "/control/resume?agent=seo", None).await?;
    let (status, job) = send(&app, Method::GET, "/dequeue?agent=seo", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["id"], json!(id));

    let (status, _) = send(&app, Method::GET, "/peek?agent=seo", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_skip_and_bring_forward() -> TestResult {
    let app = app().await?;
    let a1 = enqueue(&app, json!({"agent": "a", "model": "m"})).await?;
    let b1 = enqueue(&app, json!({"agent": "b", "model": "m"})).await?;
    let a2 = enqueue(&app, json!({"agent": "a", "model": "m"})).await?;

    let (_, moved) = send(&app, Method::POST, "/control/skip_next?agent=a", None).await?;
    assert_eq!(moved, json!({"ok": true}));

    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    let low: Vec<&str> = stats["queues"]["low"]
        .as_array()
        .ok_or("low lane missing")?
        .iter()
        .filter_map(|j| j["id"].as_str())
        .collect();
    assert_eq!(low, [b1.as_str(), a2.as_str(), a1.as_str()]);

    let (_, moved) = send(&app, Method::POST, "/control/bring_forward?agent=a", None).await?;
    assert_eq!(moved, json!({"ok": true}));
    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    assert_eq!(stats["queues"]["high"][0]["id"], json!(a2));
    assert_eq!(stats["metrics"]["by_agent"]["a"]["queued_high"], json!(1));

    let (_, moved) = send(&app, Method::POST, "/control/skip_next?agent=zzz", None).await?;
    assert_eq!(moved, json!({"ok": false}));

    Ok(())
}

#[tokio::test]
async fn test_cancel_and_stop() -> TestResult {
    let app = app().await?;
    for _ in 0..3 {
        enqueue(&app, json!({"agent": "rag", "model": "m"})).await?;
    }
    enqueue(&app, json!({"agent": "other", "model": "m"})).await?;

    let (_, inflight) = send(&app, Method::GET, "/dequeue?agent=rag", None).await?;

    let (status, removed) = send(&app, Method::DELETE, "/jobs?agent=rag", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, json!({"removed": 2}));

    enqueue(&app, json!({"agent": "rag", "model": "m"})).await?;
    let (_, stopped) = send(&app, Method::POST, "/control/stop?agent=rag", None).await?;
    assert_eq!(stopped, json!({"ok": true, "paused": true, "removed": 1}));

    let (_, state) = send(&app, Method::GET, "/control/state", None).await?;
    assert_eq!(state, json!({"paused": ["rag"]}));

    let (_, stats) = send(&app, Method::GET, "/stats", None).await?;
    assert_eq!(stats["inflight"][0]["id"], inflight["id"]);
    assert_eq!(stats["metrics"]["queued_low"], json!(1));

    Ok(())
}

#[tokio::test]
async fn test_long_poll_dequeue_times_out() -> TestResult {
    let app = app().await?;
    let (status, _) = send(&app, Method::GET, "/dequeue?agent=rag&wait_ms=20", None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_long_poll_dequeue_wakes_on_enqueue() -> TestResult {
    let app = app().await?;

    let (polled, enqueued) = tokio::join!(
        send(&app, Method::GET, "/dequeue?agent=rag&wait_ms=5000", None),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            enqueue(&app, json!({"agent": "rag", "model": "m"})).await
        }
    );
    let (status, job) = polled?;
    let id = enqueued?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["id"], json!(id));

    Ok(())
}

#[tokio::test]
async fn test_event_stream_reports_enqueue() -> TestResult {
    let app = app().await?;

    let request = Request::builder().uri("/events").body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let id = enqueue(&app, json!({"agent": "rag", "model": "m"})).await?;

    let mut body = response.into_body();
    let mut text = String::new();
    while !text.contains("\n\n") {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await?
            .ok_or("event stream ended")??;
        if let Ok(data) = frame.into_data() {
            text.push_str(std::str::from_utf8(&data)?);
        }
    }

    assert!(text.contains("event: job_enqueued\n"), "{text}");
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .ok_or("missing data line")?;
    let event: Value = serde_json::from_str(data)?;
    assert_eq!(event["event"], json!("job_enqueued"));
    assert_eq!(event["job"]["id"], json!(id));

    Ok(())
}

async fn allowed_origin(app: &Router, origin: &str) -> Result<Option<String>, Box<dyn Error>> {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, origin)
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap_or_default().to_string()))
}

#[tokio::test]
async fn test_cors_origins() -> TestResult {
    let (queue, _join) = start_queue(DEFAULT_EVENT_CAPACITY).await?;

    let listed = api::create_router(queue.clone())
        .layer(api::cors_layer(&["http://dash.test".to_string()]));
    assert_eq!(
        allowed_origin(&listed, "http://dash.test").await?.as_deref(),
        Some("http://dash.test")
    );
    assert_eq!(allowed_origin(&listed, "http://evil.test").await?, None);

    let any = api::create_router(queue).layer(api::cors_layer(&["*".to_string()]));
    assert_eq!(
        allowed_origin(&any, "http://evil.test").await?.as_deref(),
        Some("*")
    );

    Ok(())
}

#[tokio::test]
async fn test_unknown_route() -> TestResult {
    let app = app().await?;
    let (status, json) = send(&app, Method::GET, "/nope", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "not found"}));
    Ok(())
}
