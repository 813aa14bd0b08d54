//! A running queue and its worker pool

use super::config::AsyncConfig;
use super::queue::{AsyncQueue, PushOutcome, QueueEntry};
use super::stats::{BackendStats, WorkerStatus};
use super::worker::{Worker, WorkerSlot, WorkerState};
use crate::core::{diagnostics, BackendMetrics, LoggerError, OverflowCallback, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often shutdown checks whether workers have finished
const SHUTDOWN_POLL: Duration = Duration::from_millis(5);

/// One generation of the async machinery
///
/// Created by [`BackendController`](super::BackendController); once shut down
/// it never runs again and a new backend takes its place.
pub struct AsyncBackend {
    generation: u64,
    config: AsyncConfig,
    queue: Arc<AsyncQueue>,
    shutdown_signal: Arc<AtomicBool>,
    slots: Vec<Arc<WorkerSlot>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    /// `Some(drained)` once the first shutdown call has finished
    completion: Mutex<Option<bool>>,
    completed: Condvar,
    on_overflow: Option<OverflowCallback>,
}

impl AsyncBackend {
    /// Validate `config`, then spawn the queue and workers
    pub fn start(
        config: AsyncConfig,
        generation: u64,
        on_overflow: Option<OverflowCallback>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let metrics = Arc::new(BackendMetrics::new());
        let queue = Arc::new(AsyncQueue::new(
            config.max_queue_size(),
            config.overflow_strategy(),
            config.block_timeout(),
            metrics,
        ));
        let shutdown_signal = Arc::new(AtomicBool::new(false));

        let mut slots = Vec::with_capacity(config.worker_count());
        let mut handles = Vec::with_capacity(config.worker_count());
        for index in 0..config.worker_count() {
            let slot = Arc::new(WorkerSlot::new(index));
            let worker = Worker {
                slot: Arc::clone(&slot),
                queue: Arc::clone(&queue),
                shutdown: Arc::clone(&shutdown_signal),
                batch_size: config.effective_batch_size(),
                batch_timeout: config.batch_timeout(),
                poll_interval: config.poll_interval(),
            };
            match worker.spawn() {
                Ok(handle) => {
                    slots.push(slot);
                    handles.push(handle);
                }
                Err(source) => {
                    // stop the workers already running before giving up
                    shutdown_signal.store(true, Ordering::Release);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(LoggerError::WorkerSpawn { index, source });
                }
            }
        }

        Ok(Arc::new(Self {
            generation,
            config,
            queue,
            shutdown_signal,
            slots,
            handles: Mutex::new(handles),
            completion: Mutex::new(None),
            completed: Condvar::new(),
            on_overflow,
        }))
    }

    pub fn config(&self) -> &AsyncConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn metrics(&self) -> &BackendMetrics {
        self.queue.metrics()
    }

    /// Accepting entries: shutdown has not been requested
    pub fn is_running(&self) -> bool {
        !self.shutdown_signal.load(Ordering::Acquire)
    }

    /// Push an entry, applying the overflow strategy
    ///
    /// Hands the entry back if this backend is shutting down.
    pub fn submit(&self, entry: QueueEntry) -> std::result::Result<PushOutcome, QueueEntry> {
        if !self.is_running() {
            return Err(entry);
        }
        let outcome = self.queue.push(entry);
        if outcome.lost_entry() {
            self.alert_drops();
        }
        Ok(outcome)
    }

    fn alert_drops(&self) {
        let dropped = self.metrics().dropped();
        if !diagnostics::should_alert_drop(dropped) {
            return;
        }
        diagnostics::warn(
            "async",
            &format!(
                "queue full ({} capacity, {}): {} entries dropped so far",
                self.queue.capacity(),
                self.queue.strategy(),
                dropped
            ),
        );
        if let Some(callback) = &self.on_overflow {
            let result = diagnostics::guard("overflow callback", || {
                callback(dropped);
                Ok(())
            });
            if let Err(e) = result {
                diagnostics::report("async", &e);
            }
        }
    }

    pub fn stats(&self) -> BackendStats {
        let workers = self
            .slots
            .iter()
            .map(|slot| {
                let state = slot.state();
                WorkerStatus {
                    index: slot.index(),
                    state,
                    alive: state != WorkerState::Stopped,
                }
            })
            .collect();

        BackendStats {
            running: self.is_running(),
            generation: self.generation,
            queue_len: self.queue.len(),
            capacity: self.queue.capacity(),
            overflow_strategy: self.queue.strategy(),
            worker_count: self.slots.len(),
            counters: self.metrics().snapshot(),
            workers,
        }
    }

    /// Stop accepting entries, let the workers drain, and join them
    ///
    /// Returns `true` if every worker finished within `timeout`. Workers still
    /// running at the deadline are detached. Concurrent and repeated calls
    /// wait for the first call to finish and return its result.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if self.shutdown_signal.swap(true, Ordering::AcqRel) {
            return self.wait_for_completion(timeout);
        }

        let drained = self.join_workers(timeout);

        let mut completion = self.completion.lock();
        *completion = Some(drained);
        self.completed.notify_all();
        drained
    }

    fn join_workers(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = std::mem::take(&mut *self.handles.lock());

        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|h| h.is_finished());
            for handle in finished {
                if let Err(payload) = handle.join() {
                    let message = diagnostics::panic_message(payload.as_ref());
                    diagnostics::report("async", &LoggerError::panicked("worker thread", message));
                }
            }
            pending = running;

            if pending.is_empty() {
                return true;
            }
            if Instant::now() >= deadline {
                diagnostics::warn(
                    "async",
                    &format!(
                        "{} worker(s) did not finish within {:?}; {} entries left in queue",
                        pending.len(),
                        timeout,
                        self.queue.len()
                    ),
                );
                return false;
            }
            thread::sleep(SHUTDOWN_POLL);
        }
    }

    fn wait_for_completion(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut completion = self.completion.lock();
        while completion.is_none() {
            if self.completed.wait_until(&mut completion, deadline).timed_out() {
                break;
            }
        }
        (*completion).unwrap_or(false)
    }
}

impl std::fmt::Debug for AsyncBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncBackend")
            .field("generation", &self.generation)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OverflowStrategy, Pipeline, Record};
    use crate::writers::MemoryWriter;
    use std::sync::atomic::AtomicU64;

    fn memory_pipeline() -> (Arc<Pipeline>, Arc<MemoryWriter>) {
        let memory = Arc::new(MemoryWriter::new());
        let pipeline = Pipeline::builder()
            .shared_writer(memory.clone())
            .formatter(|r: &Record| -> Result<String> { Ok(r.message().to_string()) })
            .build();
        (Arc::new(pipeline), memory)
    }

    #[test]
    fn test_shutdown_drains_everything() {
        let config = AsyncConfig::builder().worker_count(2).batch_size(16).build().unwrap();
        let backend = AsyncBackend::start(config, 1, None).unwrap();
        let (pipeline, memory) = memory_pipeline();

        for i in 0..500 {
            let outcome = backend
                .submit(QueueEntry::formatted(format!("m{}", i), pipeline.clone()))
                .unwrap();
            assert!(outcome.is_accepted());
        }
        assert!(backend.shutdown(Duration::from_secs(5)));

        let stats = backend.stats();
        assert_eq!(stats.processed(), 500);
        assert_eq!(stats.queue_len, 0);
        assert_eq!(stats.alive_workers(), 0);
        assert_eq!(memory.len(), 500);
    }

    #[test]
    fn test_submit_after_shutdown_hands_entry_back() {
        let backend = AsyncBackend::start(AsyncConfig::default(), 1, None).unwrap();
        assert!(backend.shutdown(Duration::from_secs(1)));
        let (pipeline, _) = memory_pipeline();
        assert!(backend.submit(QueueEntry::formatted("late".into(), pipeline)).is_err());
    }

    #[test]
    fn test_overflow_callback_on_first_drop() {
        let seen = Arc::new(AtomicU64::new(0));
        let callback: OverflowCallback = {
            let seen = Arc::clone(&seen);
            Arc::new(move |dropped| seen.store(dropped, Ordering::SeqCst))
        };
        let config = AsyncConfig::builder()
            .max_queue_size(1)
            .overflow_strategy(OverflowStrategy::DropNewest)
            .enable_batching(false)
            .build()
            .unwrap();
        let backend = AsyncBackend::start(config, 1, Some(callback)).unwrap();
        let slow = Arc::new(
            Pipeline::builder()
                .writer(|_: &str| -> Result<()> {
                    thread::sleep(Duration::from_millis(100));
                    Ok(())
                })
                .build(),
        );

        // one entry in the writer, one in the queue: the rest must drop
        for i in 0..4 {
            let _ = backend.submit(QueueEntry::formatted(i.to_string(), slow.clone()));
        }
        assert!(seen.load(Ordering::SeqCst) >= 1);
        assert!(backend.stats().dropped() >= 2);
        backend.shutdown(Duration::from_secs(5));
    }

    #[test]
    fn test_concurrent_shutdown_agrees() {
        let backend = AsyncBackend::start(AsyncConfig::default(), 1, None).unwrap();
        let (pipeline, _) = memory_pipeline();
        for i in 0..100 {
            let _ = backend.submit(QueueEntry::formatted(i.to_string(), pipeline.clone()));
        }

        let results: Vec<bool> = (0..4)
            .map(|_| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || backend.shutdown(Duration::from_secs(5)))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(results.iter().all(|&r| r));
        assert_eq!(backend.stats().processed(), 100);
    }

    #[test]
    fn test_worker_survives_failing_writer() {
        let pipeline = Arc::new(
            Pipeline::builder()
                .writer(|payload: &str| -> Result<()> {
                    if payload.contains("boom") {
                        panic!("writer exploded");
                    }
                    Ok(())
                })
                .build(),
        );
        let config = AsyncConfig::builder().enable_batching(false).build().unwrap();
        let backend = AsyncBackend::start(config, 1, None).unwrap();

        backend.submit(QueueEntry::formatted("boom".into(), pipeline.clone())).unwrap();
        backend.submit(QueueEntry::formatted("fine".into(), pipeline.clone())).unwrap();
        assert!(backend.shutdown(Duration::from_secs(5)));

        assert_eq!(backend.stats().processed(), 2);
        assert_eq!(pipeline.metrics().writer_failures(), 1);
    }
}
