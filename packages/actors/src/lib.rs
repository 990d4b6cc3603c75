//! Actor system for the job queue.
//!
//! This crate provides the Ractor-based actor that owns the priority queue
//! engine, and the handle every other component uses to talk to it.
//!
//! # Architecture
//!
//! - `QueueActor` - Owns one `QueueEngine`; its mailbox serializes all operations
//! - `QueueHandle` - Cloneable async request/reply client for the actor
//!
//! # Usage
//!
//! ```ignore
//! use actors::{start_queue, DEFAULT_EVENT_CAPACITY};
//!
//! let (queue, _join) = start_queue(DEFAULT_EVENT_CAPACITY).await?;
//! queue.enqueue(Job::new("rag", "llama3")).await?;
//! let next = queue.dequeue("rag").await?;
//! ```

mod handle;
mod messages;
mod queue_actor;

pub use handle::{DEFAULT_EVENT_CAPACITY, QueueHandle, start_queue};
pub use messages::{ActorError, ActorResult, QueueMessage};
pub use queue_actor::{QueueActor, QueueActorState};
