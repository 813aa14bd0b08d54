//! Point-in-time backend statistics

use super::worker::WorkerState;
use crate::core::{MetricsSnapshot, OverflowStrategy};
use serde::Serialize;

/// Status of one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub index: usize,
    pub state: WorkerState,
    pub alive: bool,
}

/// Snapshot of an async backend
///
/// Values are read independently and may be slightly inconsistent with each
/// other under load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStats {
    /// Whether a backend is currently accepting entries
    pub running: bool,
    /// Number of backends this controller has started so far
    pub generation: u64,
    pub queue_len: usize,
    pub capacity: usize,
    pub overflow_strategy: OverflowStrategy,
    pub worker_count: usize,
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub workers: Vec<WorkerStatus>,
}

impl BackendStats {
    /// Stats for a controller that has never started a backend
    pub fn idle() -> Self {
        Self {
            running: false,
            generation: 0,
            queue_len: 0,
            capacity: 0,
            overflow_strategy: OverflowStrategy::default(),
            worker_count: 0,
            counters: MetricsSnapshot::default(),
            workers: Vec::new(),
        }
    }

    pub fn enqueued(&self) -> u64 {
        self.counters.enqueued
    }

    pub fn processed(&self) -> u64 {
        self.counters.processed
    }

    pub fn dropped(&self) -> u64 {
        self.counters.dropped
    }

    pub fn alive_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.alive).count()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
