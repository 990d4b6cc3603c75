//! Message types for actor communication.

use queue_core::{ControlState, Job, JobId, JobOutcome, MovedJob, PeekInfo, QueueSnapshot};
use ractor::RpcReplyPort;

/// Messages for the QueueActor.
///
/// Every variant maps to one engine operation. The actor handles them one
/// at a time, so each operation sees and leaves a consistent queue.
#[derive(Debug)]
pub enum QueueMessage {
    // Data plane
    /// Append a job to its lane. Replies `None` for a duplicate id.
    Enqueue {
        job: Box<Job>,
        reply: RpcReplyPort<Option<Job>>,
    },

    /// Claim the next job for an agent.
    Dequeue {
        agent: String,
        reply: RpcReplyPort<Option<Job>>,
    },

    /// Report that an inflight job finished.
    Complete {
        job_id: JobId,
        outcome: JobOutcome,
        reply: RpcReplyPort<bool>,
    },

    // Read-only views
    /// Copy lanes and inflight set.
    Snapshot { reply: RpcReplyPort<QueueSnapshot> },

    /// Locate an agent's next job without claiming it.
    Peek {
        agent: String,
        reply: RpcReplyPort<Option<PeekInfo>>,
    },

    /// List paused agents.
    GetControlState { reply: RpcReplyPort<ControlState> },

    // Control plane
    /// Send an agent's next job to the back of its lane.
    SkipNext {
        agent: String,
        reply: RpcReplyPort<Option<MovedJob>>,
    },

    /// Move an agent's next job to the front of the high lane.
    BringForward {
        agent: String,
        reply: RpcReplyPort<Option<MovedJob>>,
    },

    /// Remove all of an agent's queued jobs.
    CancelQueued {
        agent: String,
        reply: RpcReplyPort<usize>,
    },

    /// Stop delivering jobs to an agent.
    Pause {
        agent: String,
        reply: RpcReplyPort<bool>,
    },

    /// Resume delivering jobs to an agent.
    Resume {
        agent: String,
        reply: RpcReplyPort<bool>,
    },

    /// Pause an agent and cancel its queued jobs.
    Stop {
        agent: String,
        reply: RpcReplyPort<usize>,
    },

    /// Shutdown the queue actor.
    Shutdown,
}

/// Result type for actor operations.
pub type ActorResult<T> = Result<T, ActorError>;

/// Error type for actor operations.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Queue actor is not running: {0}")]
    Unavailable(String),

    #[error("Queue actor dropped the reply")]
    NoReply,

    #[error("Failed to spawn queue actor: {0}")]
    Spawn(#[from] ractor::SpawnErr),
}
