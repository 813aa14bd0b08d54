//! Worker threads draining the async queue

use super::queue::{AsyncQueue, QueueEntry};
use crate::core::{diagnostics, Pipeline};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle of a worker: `Running -> Draining -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WorkerState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }
}

/// State cell shared between a worker thread and its backend
#[derive(Debug)]
pub(crate) struct WorkerSlot {
    index: usize,
    state: AtomicU8,
}

impl WorkerSlot {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            state: AtomicU8::new(WorkerState::Running as u8),
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Marks the slot stopped however the thread exits
struct StopOnExit<'a>(&'a WorkerSlot);

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        self.0.set_state(WorkerState::Stopped);
    }
}

pub(crate) struct Worker {
    pub(crate) slot: Arc<WorkerSlot>,
    pub(crate) queue: Arc<AsyncQueue>,
    pub(crate) shutdown: Arc<AtomicBool>,
    pub(crate) batch_size: usize,
    pub(crate) batch_timeout: Duration,
    pub(crate) poll_interval: Duration,
}

impl Worker {
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("log-worker-{}", self.slot.index()))
            .spawn(move || self.run())
    }

    fn run(self) {
        let _stop = StopOnExit(&self.slot);
        let mut batch: Vec<QueueEntry> = Vec::with_capacity(self.batch_size);
        let mut batch_started: Option<Instant> = None;

        loop {
            let shutting_down = self.shutdown.load(Ordering::Acquire);
            if shutting_down {
                self.slot.set_state(WorkerState::Draining);
            }

            let received = if shutting_down {
                self.queue.try_pop()
            } else {
                let wait = match batch_started {
                    Some(started) => self
                        .batch_timeout
                        .saturating_sub(started.elapsed())
                        .min(self.poll_interval),
                    None => self.poll_interval,
                };
                self.queue.pop_timeout(wait)
            };

            match received {
                Some(entry) => {
                    batch_started.get_or_insert_with(Instant::now);
                    batch.push(entry);
                }
                None if shutting_down => {
                    // queue observed empty after the shutdown signal
                    self.flush(&mut batch);
                    break;
                }
                None => {}
            }

            let expired = batch_started.is_some_and(|t| t.elapsed() >= self.batch_timeout);
            if batch.len() >= self.batch_size || (expired && !batch.is_empty()) {
                self.flush(&mut batch);
                batch_started = None;
            }
        }
    }

    fn flush(&self, batch: &mut Vec<QueueEntry>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len() as u64;
        let entries = std::mem::take(batch);
        let stage = format!("worker-{}", self.slot.index());

        let result = diagnostics::guard(&stage, || {
            process_batch(entries);
            Ok(())
        });
        if let Err(e) = result {
            self.queue.metrics().record_batch_failure();
            diagnostics::report(&stage, &e);
        }
        self.queue.metrics().record_processed(count);
    }
}

/// Render a batch and write it, one payload per run of consecutive entries
/// sharing a pipeline
pub(crate) fn process_batch(entries: Vec<QueueEntry>) {
    let mut current: Option<Arc<Pipeline>> = None;
    let mut lines: Vec<String> = Vec::new();

    for entry in entries {
        let same = current
            .as_ref()
            .is_some_and(|p| Arc::ptr_eq(p, entry.pipeline()));
        if !same {
            if let Some(pipeline) = current.take() {
                write_group(&pipeline, &mut lines);
            }
            current = Some(Arc::clone(entry.pipeline()));
        }
        if let Some(line) = entry.into_line() {
            lines.push(line);
        }
    }

    if let Some(pipeline) = current {
        write_group(&pipeline, &mut lines);
    }
}

fn write_group(pipeline: &Pipeline, lines: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    pipeline.write(&lines.join("\n"));
    lines.clear();
}
