//! Typed async client for a running queue actor.

use std::time::Duration;

use queue_core::{
    ControlState, Job, JobEvent, JobId, JobOutcome, MovedJob, PeekInfo, QueueSnapshot,
};
use ractor::{Actor, ActorRef, RpcReplyPort};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::messages::{ActorError, ActorResult, QueueMessage};
use crate::queue_actor::{QueueActor, QueueActorState};

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Cheaply cloneable handle to one queue actor.
///
/// Each method is a single request/reply round trip through the actor
/// mailbox, so callers on any task observe whole operations only.
#[derive(Clone)]
pub struct QueueHandle {
    actor: ActorRef<QueueMessage>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl QueueHandle {
    /// Send a message built around a fresh reply port and await the answer.
    async fn call<T>(&self, build: impl FnOnce(RpcReplyPort<T>) -> QueueMessage) -> ActorResult<T>
    where
        T: Send + 'static,
    {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(build(tx.into()))
            .map_err(|e| ActorError::Unavailable(e.to_string()))?;
        rx.await.map_err(|_| ActorError::NoReply)
    }

    /// Queue a job. `None` means its id is already queued or inflight.
    pub async fn enqueue(&self, job: Job) -> ActorResult<Option<Job>> {
        self.call(|reply| QueueMessage::Enqueue {
            job: Box::new(job),
            reply,
        })
        .await
    }

    /// Non-blocking poll for the agent's next job.
    pub async fn dequeue(&self, agent: &str) -> ActorResult<Option<Job>> {
        self.call(|reply| QueueMessage::Dequeue {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    /// Poll for the agent's next job, waiting up to `wait` for one to arrive.
    ///
    /// The event subscription is taken before the first poll so an enqueue
    /// landing between the poll and the wait is not missed.
    pub async fn dequeue_wait(&self, agent: &str, wait: Duration) -> ActorResult<Option<Job>> {
        let mut events = self.subscribe();
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            if let Some(job) = self.dequeue(agent).await? {
                return Ok(Some(job));
            }

            loop {
                match tokio::time::timeout_at(deadline, events.recv()).await {
                    Err(_) => return Ok(None),
                    Ok(Ok(event)) if event.may_unblock() && event.agent() == agent => break,
                    Ok(Ok(_)) => continue,
                    Ok(Err(RecvError::Lagged(skipped))) => {
                        tracing::warn!("Long poll for {} lagged by {} events", agent, skipped);
                        break;
                    }
                    Ok(Err(RecvError::Closed)) => return Ok(None),
                }
            }
        }
    }

    /// Report an inflight job finished. Returns whether it was inflight.
    pub async fn complete(&self, job_id: JobId, outcome: JobOutcome) -> ActorResult<bool> {
        self.call(|reply| QueueMessage::Complete {
            job_id,
            outcome,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> ActorResult<QueueSnapshot> {
        self.call(|reply| QueueMessage::Snapshot { reply }).await
    }

    pub async fn peek(&self, agent: &str) -> ActorResult<Option<PeekInfo>> {
        self.call(|reply| QueueMessage::Peek {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    pub async fn control_state(&self) -> ActorResult<ControlState> {
        self.call(|reply| QueueMessage::GetControlState { reply })
            .await
    }

    pub async fn skip_next(&self, agent: &str) -> ActorResult<Option<MovedJob>> {
        self.call(|reply| QueueMessage::SkipNext {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    pub async fn bring_forward(&self, agent: &str) -> ActorResult<Option<MovedJob>> {
        self.call(|reply| QueueMessage::BringForward {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    pub async fn cancel_queued(&self, agent: &str) -> ActorResult<usize> {
        self.call(|reply| QueueMessage::CancelQueued {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    pub async fn pause(&self, agent: &str) -> ActorResult<bool> {
        self.call(|reply| QueueMessage::Pause {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    pub async fn resume(&self, agent: &str) -> ActorResult<bool> {
        self.call(|reply| QueueMessage::Resume {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    /// Pause the agent and cancel its queued jobs in one step.
    pub async fn stop(&self, agent: &str) -> ActorResult<usize> {
        self.call(|reply| QueueMessage::Stop {
            agent: agent.to_string(),
            reply,
        })
        .await
    }

    /// Subscribe to the queue's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Ask the actor to stop after draining messages already queued.
    pub fn shutdown(&self) -> ActorResult<()> {
        self.actor
            .send_message(QueueMessage::Shutdown)
            .map_err(|e| ActorError::Unavailable(e.to_string()))
    }
}

/// Spawn a queue actor with an empty engine.
///
/// Every call creates an independent queue; nothing is registered globally.
pub async fn start_queue(event_capacity: usize) -> ActorResult<(QueueHandle, JoinHandle<()>)> {
    let (event_tx, _) = broadcast::channel(event_capacity.max(1));
    let state = QueueActorState::new(event_tx.clone());

    let (actor, join) = Actor::spawn(None, QueueActor, state).await?;

    Ok((QueueHandle { actor, event_tx }, join))
}
