//! What an agent does with the jobs addressed to it.

use std::future::Future;
use std::pin::Pin;

use queue_core::{Job, JobOutcome};

/// Boxed future resolving to the outcome reported back to the queue.
pub type HandlerFuture = Pin<Box<dyn Future<Output = JobOutcome> + Send>>;

/// Processes jobs for one agent.
///
/// The returned outcome is sent as the job's completion, so a handler
/// signals failure with `JobOutcome::failed` rather than an error type.
pub trait JobHandler: Send + Sync + 'static {
    /// Agent name this handler polls for.
    fn agent(&self) -> &str;

    fn handle(&self, job: Job) -> HandlerFuture;
}

/// Handler backed by an async closure.
pub struct FnHandler<F> {
    agent: String,
    run: F,
}

/// Build a handler for `agent` from an async closure.
///
/// ```ignore
/// let handler = handler_fn("rag", |job: Job| async move {
///     match answer(&job.payload).await {
///         Ok(_) => JobOutcome::Ok,
///         Err(e) => JobOutcome::failed(e.to_string()),
///     }
/// });
/// ```
pub fn handler_fn<F, Fut>(agent: impl Into<String>, run: F) -> FnHandler<F>
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = JobOutcome> + Send + 'static,
{
    FnHandler {
        agent: agent.into(),
        run,
    }
}

impl<F, Fut> JobHandler for FnHandler<F>
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = JobOutcome> + Send + 'static,
{
    fn agent(&self) -> &str {
        &self.agent
    }

    fn handle(&self, job: Job) -> HandlerFuture {
        Box::pin((self.run)(job))
    }
}
