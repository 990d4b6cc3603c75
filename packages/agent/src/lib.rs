//! Agent-side SDK for the job queue.
//!
//! - `QueueClient` - HTTP client for enqueue, dequeue and complete
//! - `JobHandler` - What an agent does with each job
//! - `AgentWorker` - Actor running the poll, handle, complete loop
//!
//! # Usage
//!
//! ```ignore
//! use agent::{JobOutcome, QueueClient, WorkerArgs, handler_fn, start_worker};
//!
//! let handler = handler_fn("rag", |job: Job| async move {
//!     tracing::info!("payload: {}", job.payload);
//!     JobOutcome::Ok
//! });
//! start_worker(WorkerArgs {
//!     client: QueueClient::new("http://localhost:7000"),
//!     handler: Arc::new(handler),
//!     poll_interval: Duration::from_secs(1),
//!     once: false,
//! })
//! .await?;
//! ```

mod client;
mod handler;
mod worker;

pub use client::{ClientError, ClientResult, NewJob, QueueClient};
pub use handler::{FnHandler, HandlerFuture, JobHandler, handler_fn};
pub use worker::{AgentWorker, WorkerArgs, WorkerMessage, WorkerStats, poll_once, start_worker};

/// Re-export core types for convenience.
pub use queue_core::{Job, JobId, JobOutcome, Priority};
