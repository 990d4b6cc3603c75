//! Core domain types and the queue engine.
//!
//! This crate contains the pieces shared across all packages:
//! - Job, JobId, Priority and JobOutcome for work items
//! - QueueEngine, the two-lane priority queue with per-agent control state
//! - Snapshots and metrics for observability
//! - Events for real-time updates

mod engine;
mod events;
mod job;
mod snapshot;

pub use engine::{Lane, MovedJob, QueueEngine};
pub use events::JobEvent;
pub use job::{Job, JobId, JobOutcome, Priority};
pub use snapshot::{
    AgentMetrics, ControlState, LaneContents, PeekInfo, QueueMetrics, QueueSnapshot, QueueStats,
};
