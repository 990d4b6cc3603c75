//! Queue actor owning the priority queue engine.

use chrono::Utc;
use queue_core::{JobEvent, QueueEngine};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::sync::broadcast;

use crate::messages::QueueMessage;

/// State for the queue actor.
pub struct QueueActorState {
    /// Lanes, inflight registry and paused set.
    engine: QueueEngine,
    /// Event broadcaster.
    event_tx: broadcast::Sender<JobEvent>,
}

impl QueueActorState {
    /// Create a new queue actor state around an empty engine.
    pub fn new(event_tx: broadcast::Sender<JobEvent>) -> Self {
        Self {
            engine: QueueEngine::new(),
            event_tx,
        }
    }

    /// Broadcast an event. Having no subscribers is not an error.
    fn broadcast(&self, event: JobEvent) {
        tracing::debug!("{}", event.description());
        let _ = self.event_tx.send(event);
    }
}

/// Queue actor that serializes every engine operation through its mailbox.
pub struct QueueActor;

impl Actor for QueueActor {
    type Msg = QueueMessage;
    type State = QueueActorState;
    type Arguments = QueueActorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting queue actor");
        Ok(args)
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::info!(
            queued = state.engine.queued_len(),
            inflight = state.engine.inflight_len(),
            "Queue actor stopped"
        );
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            QueueMessage::Enqueue { job, reply } => {
                let id = job.id.clone();
                let stored = state.engine.enqueue(*job);
                match stored {
                    Some(ref job) => state.broadcast(JobEvent::JobEnqueued {
                        job: job.clone(),
                        timestamp: Utc::now(),
                    }),
                    None => tracing::debug!("Rejecting duplicate job id {}", id),
                }
                let _ = reply.send(stored);
            }

            QueueMessage::Dequeue { agent, reply } => {
                let job = state.engine.dequeue_for_agent(&agent);
                if let Some(ref job) = job {
                    state.broadcast(JobEvent::JobDequeued {
                        job_id: job.id.clone(),
                        agent,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(job);
            }

            QueueMessage::Complete {
                job_id,
                outcome,
                reply,
            } => {
                let found = match state.engine.complete(&job_id) {
                    Some(job) => {
                        state.broadcast(JobEvent::JobCompleted {
                            job_id,
                            agent: job.agent,
                            outcome,
                            timestamp: Utc::now(),
                        });
                        true
                    }
                    None => {
                        tracing::debug!("Ignoring completion for unknown job {}", job_id);
                        false
                    }
                };
                let _ = reply.send(found);
            }

            QueueMessage::Snapshot { reply } => {
                let _ = reply.send(state.engine.snapshot());
            }

            QueueMessage::Peek { agent, reply } => {
                let _ = reply.send(state.engine.peek_for_agent(&agent));
            }

            QueueMessage::GetControlState { reply } => {
                let _ = reply.send(state.engine.control_state());
            }

            QueueMessage::SkipNext { agent, reply } => {
                let moved = state.engine.skip_next_for_agent(&agent);
                if let Some(ref moved) = moved {
                    state.broadcast(JobEvent::skipped(&agent, moved));
                }
                let _ = reply.send(moved);
            }

            QueueMessage::BringForward { agent, reply } => {
                let moved = state.engine.bring_forward_for_agent(&agent);
                if let Some(ref moved) = moved {
                    state.broadcast(JobEvent::brought_forward(&agent, moved));
                }
                let _ = reply.send(moved);
            }

            QueueMessage::CancelQueued { agent, reply } => {
                let removed = state.engine.cancel_queued_for_agent(&agent);
                if removed > 0 {
                    state.broadcast(JobEvent::JobsCancelled {
                        agent,
                        removed,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(removed);
            }

            QueueMessage::Pause { agent, reply } => {
                let changed = state.engine.pause(&agent);
                if changed {
                    state.broadcast(JobEvent::AgentPaused {
                        agent,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(changed);
            }

            QueueMessage::Resume { agent, reply } => {
                let changed = state.engine.resume(&agent);
                if changed {
                    state.broadcast(JobEvent::AgentResumed {
                        agent,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(changed);
            }

            QueueMessage::Stop { agent, reply } => {
                let newly_paused = !state.engine.is_paused(&agent);
                let removed = state.engine.stop(&agent);
                if newly_paused {
                    state.broadcast(JobEvent::AgentPaused {
                        agent: agent.clone(),
                        timestamp: Utc::now(),
                    });
                }
                if removed > 0 {
                    state.broadcast(JobEvent::JobsCancelled {
                        agent,
                        removed,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(removed);
            }

            QueueMessage::Shutdown => {
                tracing::info!("Shutting down queue actor");
                myself.stop(None);
            }
        }

        Ok(())
    }
}
