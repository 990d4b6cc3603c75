//! The priority queue engine: two lanes, the inflight registry and the
//! paused-agent set.
//!
//! `QueueEngine` is a plain synchronous state machine. It does no locking
//! of its own; whoever owns it must run every operation to completion
//! before starting the next one so that lane, inflight and paused state
//! always change together.
//!
//! Per-agent lookups are linear scans, oldest job first. There is no
//! per-agent index, which is fine for lanes of a few thousand jobs.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobId, Priority};
use crate::snapshot::{ControlState, PeekInfo, QueueSnapshot};

/// One of the two ordered job collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    High,
    Low,
}

impl Lane {
    /// Delivery preference: the high lane is always scanned first.
    const SCAN_ORDER: [Lane; 2] = [Lane::High, Lane::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::High => "high",
            Lane::Low => "low",
        }
    }
}

impl From<Priority> for Lane {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::High => Lane::High,
            Priority::Low => Lane::Low,
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job that a control operation moved within or across lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedJob {
    pub id: JobId,
    pub from: Lane,
    pub to: Lane,
}

#[derive(Debug, Clone)]
struct InflightJob {
    job: Job,
    /// Monotonic delivery counter, used to list inflight jobs in the order
    /// they were handed out.
    delivery: u64,
}

/// In-memory two-lane priority queue with per-agent control state.
#[derive(Debug, Default)]
pub struct QueueEngine {
    high: VecDeque<Job>,
    low: VecDeque<Job>,
    inflight: HashMap<JobId, InflightJob>,
    paused: BTreeSet<String>,
    deliveries: u64,
}

impl QueueEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, lane: Lane) -> &VecDeque<Job> {
        match lane {
            Lane::High => &self.high,
            Lane::Low => &self.low,
        }
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut VecDeque<Job> {
        match lane {
            Lane::High => &mut self.high,
            Lane::Low => &mut self.low,
        }
    }

    /// Find the agent's next job: first match in the high lane, then the low lane.
    fn locate(&self, agent: &str) -> Option<(Lane, usize)> {
        Lane::SCAN_ORDER.into_iter().find_map(|lane| {
            self.lane(lane)
                .iter()
                .position(|job| job.agent == agent)
                .map(|index| (lane, index))
        })
    }

    /// Remove the agent's next job from whichever lane holds it.
    fn take_next(&mut self, agent: &str) -> Option<(Lane, Job)> {
        let (lane, index) = self.locate(agent)?;
        self.lane_mut(lane).remove(index).map(|job| (lane, job))
    }

    /// Append a job to the tail of the lane matching its priority.
    ///
    /// Returns `None`, leaving the queue untouched, if a job with the same
    /// id is already queued or inflight.
    pub fn enqueue(&mut self, job: Job) -> Option<Job> {
        if self.contains(&job.id) {
            return None;
        }
        let lane = Lane::from(job.priority);
        self.lane_mut(lane).push_back(job.clone());
        Some(job)
    }

    /// Claim the agent's oldest job, high lane first, and mark it inflight.
    ///
    /// Returns `None` without looking at the lanes if the agent is paused.
    pub fn dequeue_for_agent(&mut self, agent: &str) -> Option<Job> {
        if self.is_paused(agent) {
            return None;
        }

        let (_, job) = self.take_next(agent)?;
        self.deliveries += 1;
        self.inflight.insert(
            job.id.clone(),
            InflightJob {
                job: job.clone(),
                delivery: self.deliveries,
            },
        );
        Some(job)
    }

    /// Drop a job from the inflight registry.
    ///
    /// Unknown ids are ignored so duplicate or late completions are harmless.
    pub fn complete(&mut self, id: &JobId) -> Option<Job> {
        self.inflight.remove(id).map(|entry| entry.job)
    }

    /// Where the agent's next job sits, ignoring whether the agent is paused.
    pub fn peek_for_agent(&self, agent: &str) -> Option<PeekInfo> {
        let (lane, position) = self.locate(agent)?;
        self.lane(lane).get(position).map(|job| PeekInfo {
            job: job.clone(),
            lane,
            position,
        })
    }

    /// Send the agent's next job to the back of its own lane.
    pub fn skip_next_for_agent(&mut self, agent: &str) -> Option<MovedJob> {
        let (lane, job) = self.take_next(agent)?;
        let id = job.id.clone();
        self.lane_mut(lane).push_back(job);
        Some(MovedJob {
            id,
            from: lane,
            to: lane,
        })
    }

    /// Move the agent's next job to the front of the high lane.
    ///
    /// A job found in the low lane is promoted across lanes; there is no
    /// reverse operation.
    pub fn bring_forward_for_agent(&mut self, agent: &str) -> Option<MovedJob> {
        let (lane, job) = self.take_next(agent)?;
        let id = job.id.clone();
        self.high.push_front(job);
        Some(MovedJob {
            id,
            from: lane,
            to: Lane::High,
        })
    }

    /// Remove every queued job for the agent. Inflight jobs are untouched.
    pub fn cancel_queued_for_agent(&mut self, agent: &str) -> usize {
        let before = self.queued_len();
        self.high.retain(|job| job.agent != agent);
        self.low.retain(|job| job.agent != agent);
        before - self.queued_len()
    }

    /// Block delivery to the agent. Returns `false` if it was already paused.
    pub fn pause(&mut self, agent: &str) -> bool {
        self.paused.insert(agent.to_string())
    }

    /// Allow delivery to the agent again. Returns `false` if it wasn't paused.
    pub fn resume(&mut self, agent: &str) -> bool {
        self.paused.remove(agent)
    }

    /// Pause the agent, then cancel all of its queued jobs.
    pub fn stop(&mut self, agent: &str) -> usize {
        self.pause(agent);
        self.cancel_queued_for_agent(agent)
    }

    pub fn is_paused(&self, agent: &str) -> bool {
        self.paused.contains(agent)
    }

    pub fn control_state(&self) -> ControlState {
        ControlState {
            paused: self.paused.iter().cloned().collect(),
        }
    }

    /// Copy both lanes in order and the inflight set in delivery order.
    pub fn snapshot(&self) -> QueueSnapshot {
        let mut inflight: Vec<&InflightJob> = self.inflight.values().collect();
        inflight.sort_by_key(|entry| entry.delivery);

        QueueSnapshot::new(
            self.high.iter().cloned().collect(),
            self.low.iter().cloned().collect(),
            inflight.into_iter().map(|entry| entry.job.clone()).collect(),
        )
    }

    /// Number of jobs waiting in either lane.
    pub fn queued_len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_inflight(&self, id: &JobId) -> bool {
        self.inflight.contains_key(id)
    }

    /// Whether a job with this id is queued in either lane or inflight.
    pub fn contains(&self, id: &JobId) -> bool {
        self.is_inflight(id) || self.high.iter().chain(&self.low).any(|job| &job.id == id)
    }
}
