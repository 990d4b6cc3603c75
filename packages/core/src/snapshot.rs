//! Read-only views of the queue: snapshots, derived metrics and peek results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::Lane;
use crate::job::Job;

/// Contents of both lanes, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneContents {
    pub high: Vec<Job>,
    pub low: Vec<Job>,
}

/// A consistent copy of the lanes and the inflight set, taken at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub queues: LaneContents,
    pub inflight: Vec<Job>,
}

impl QueueSnapshot {
    pub fn new(high: Vec<Job>, low: Vec<Job>, inflight: Vec<Job>) -> Self {
        Self {
            queues: LaneContents { high, low },
            inflight,
        }
    }

    /// Aggregate counts, overall and per agent.
    pub fn metrics(&self) -> QueueMetrics {
        let mut by_agent: BTreeMap<String, AgentMetrics> = BTreeMap::new();

        for job in &self.queues.high {
            by_agent.entry(job.agent.clone()).or_default().queued_high += 1;
        }
        for job in &self.queues.low {
            by_agent.entry(job.agent.clone()).or_default().queued_low += 1;
        }
        for job in &self.inflight {
            by_agent.entry(job.agent.clone()).or_default().inflight += 1;
        }

        QueueMetrics {
            queued_high: self.queues.high.len(),
            queued_low: self.queues.low.len(),
            inflight: self.inflight.len(),
            by_agent,
        }
    }

    /// Attach derived metrics, producing the full stats view.
    pub fn into_stats(self) -> QueueStats {
        let metrics = self.metrics();
        QueueStats {
            snapshot: self,
            metrics,
        }
    }
}

/// Per-agent job counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub queued_high: usize,
    pub queued_low: usize,
    pub inflight: usize,
}

impl AgentMetrics {
    pub fn queued(&self) -> usize {
        self.queued_high + self.queued_low
    }
}

/// Queue-wide job counts with a per-agent breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueMetrics {
    pub queued_high: usize,
    pub queued_low: usize,
    pub inflight: usize,
    pub by_agent: BTreeMap<String, AgentMetrics>,
}

/// Snapshot plus metrics, as served to dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    #[serde(flatten)]
    pub snapshot: QueueSnapshot,
    pub metrics: QueueMetrics,
}

/// Position of an agent's next job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeekInfo {
    pub job: Job,
    pub lane: Lane,
    /// Zero-based index within the lane.
    pub position: usize,
}

/// Control-plane state: which agents are paused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub paused: Vec<String>,
}
