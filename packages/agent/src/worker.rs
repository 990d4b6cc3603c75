//! Worker actor that polls the queue and runs jobs through a handler.

use std::sync::Arc;
use std::time::Duration;

use queue_core::{Job, JobOutcome};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};

use crate::client::{ClientResult, QueueClient};
use crate::handler::JobHandler;

/// Messages for the AgentWorker.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Drain available jobs, then schedule the next poll.
    Poll,

    /// Get processing counters.
    GetStats { reply: RpcReplyPort<WorkerStats> },

    /// Shutdown the worker.
    Shutdown,
}

/// Counters for jobs this worker has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: u64,
    pub failed: u64,
}

impl WorkerStats {
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub client: QueueClient,
    pub handler: Arc<dyn JobHandler>,
    pub poll_interval: Duration,
    /// Stop after the first poll cycle instead of looping.
    pub once: bool,
}

/// State for the worker actor.
pub struct WorkerState {
    client: QueueClient,
    handler: Arc<dyn JobHandler>,
    poll_interval: Duration,
    once: bool,
    stats: WorkerStats,
}

/// Run a handler on one job, reporting a panic as a failure.
async fn run_handler(handler: &Arc<dyn JobHandler>, job: Job) -> JobOutcome {
    tokio::spawn(handler.handle(job))
        .await
        .unwrap_or_else(|e| JobOutcome::failed(format!("handler panicked: {}", e)))
}

/// Poll once: claim the agent's next job, run it and report the outcome.
///
/// Returns the outcome, or `None` if there was no work.
pub async fn poll_once(
    client: &QueueClient,
    handler: &Arc<dyn JobHandler>,
) -> ClientResult<Option<JobOutcome>> {
    let Some(job) = client.dequeue(handler.agent()).await? else {
        return Ok(None);
    };

    tracing::info!("[{}] Processing job {} ({})", handler.agent(), job.id, job.model);
    let outcome = run_handler(handler, job.clone()).await;
    if let JobOutcome::Error { error } = &outcome {
        tracing::warn!(
            "[{}] Job {} failed: {}",
            handler.agent(),
            job.id,
            error.as_deref().unwrap_or("no detail")
        );
    }

    client.complete(&job.id, &outcome).await?;
    Ok(Some(outcome))
}

/// Worker actor for one agent.
///
/// Jobs are processed back to back while any are available; the worker
/// only sleeps for the poll interval once the queue reports no work.
pub struct AgentWorker;

impl Actor for AgentWorker {
    type Msg = WorkerMessage;
    type State = WorkerState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting worker for agent {} against {}",
            args.handler.agent(),
            args.client.base_url()
        );

        myself.send_message(WorkerMessage::Poll)?;

        Ok(WorkerState {
            client: args.client,
            handler: args.handler,
            poll_interval: args.poll_interval,
            once: args.once,
            stats: WorkerStats::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::Poll => {
                loop {
                    match poll_once(&state.client, &state.handler).await {
                        Ok(Some(outcome)) => {
                            if outcome.is_ok() {
                                state.stats.succeeded += 1;
                            } else {
                                state.stats.failed += 1;
                            }
                            if state.once {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!("[{}] Queue poll failed: {}", state.handler.agent(), e);
                            break;
                        }
                    }
                }

                if state.once {
                    myself.stop(None);
                    return Ok(());
                }

                let myself_clone = myself.clone();
                let interval = state.poll_interval;
                tokio::spawn(async move {
                    tokio::time::sleep(interval).await;
                    let _ = myself_clone.send_message(WorkerMessage::Poll);
                });
            }

            WorkerMessage::GetStats { reply } => {
                let _ = reply.send(state.stats);
            }

            WorkerMessage::Shutdown => {
                tracing::info!("Shutting down worker: {}", state.handler.agent());
                myself.stop(None);
            }
        }

        Ok(())
    }
}

/// Start a worker actor.
pub async fn start_worker(
    args: WorkerArgs,
) -> Result<(ActorRef<WorkerMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    Actor::spawn(None, AgentWorker, args).await
}
