//! Generic queue agent.
//!
//! Polls the queue for jobs addressed to `AGENT_NAME`, logs each payload and
//! reports success. Useful for smoke-testing a deployment and as a template
//! for real agents.

use std::sync::Arc;
use std::time::Duration;

use agent::{Job, JobOutcome, QueueClient, WorkerArgs, handler_fn, start_worker};
use tracing::{error, info};

const DEFAULT_QUEUE_URL: &str = "http://localhost:7000";
const DEFAULT_POLL_MS: u64 = 1000;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let agent_name = std::env::var("AGENT_NAME").map_err(|_| "AGENT_NAME must be set")?;
    let queue_url = env_or("QUEUE_URL", DEFAULT_QUEUE_URL);
    let mut poll_ms = env_or("POLL_MS", &DEFAULT_POLL_MS.to_string())
        .parse()
        .unwrap_or(DEFAULT_POLL_MS);
    let mut once = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => once = true,
            "--poll-ms" => {
                let value = args.next().ok_or("--poll-ms needs a value")?;
                poll_ms = value.parse()?;
            }
            other => return Err(format!("unknown argument: {}", other).into()),
        }
    }

    info!("Starting agent {} (QUEUE_URL={})", agent_name, queue_url);

    let handler = handler_fn(agent_name, |job: Job| async move {
        info!("Job {} for model {}: {}", job.id, job.model, job.payload);
        JobOutcome::Ok
    });

    let (worker, handle) = start_worker(WorkerArgs {
        client: QueueClient::new(queue_url),
        handler: Arc::new(handler),
        poll_interval: Duration::from_millis(poll_ms),
        once,
    })
    .await?;

    tokio::select! {
        result = handle => {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping worker");
            worker.stop(None);
        }
    }

    Ok(())
}
