//! Lifecycle of the async backend
//!
//! The controller owns at most one running [`AsyncBackend`]. It starts one on
//! first use, replaces it after a shutdown, and shuts it down when dropped.
//! A process-wide controller is available through [`global`]; tests and
//! embedders can create private controllers instead.

use super::backend::AsyncBackend;
use super::config::AsyncConfig;
use super::queue::{PushOutcome, QueueEntry};
use super::stats::BackendStats;
use crate::core::{diagnostics, LoggerError, OverflowCallback, Result};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Default timeout for graceful shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Returned when an entry could not be queued; carries the entry back so the
/// caller can deliver it another way
#[derive(Debug)]
pub struct SubmitError {
    pub error: LoggerError,
    pub entry: QueueEntry,
}

/// Producers read `current` without locking. Starting and stopping a
/// backend happen under `lifecycle`.
#[derive(Default)]
pub struct BackendController {
    current: ArcSwapOption<AsyncBackend>,
    /// Most recently shut down backend, kept so its final stats stay readable
    retired: Mutex<Option<Arc<AsyncBackend>>>,
    lifecycle: Mutex<()>,
    /// Shutdowns that have stopped a backend but not yet returned; no new
    /// backend starts while this is non-zero
    shutdowns_in_flight: AtomicUsize,
    generation: AtomicU64,
    on_overflow: Option<OverflowCallback>,
}

impl BackendController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose backends call `callback` with the drop count on the
    /// first overflow and periodically after
    pub fn with_overflow_callback(callback: OverflowCallback) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            retired: Mutex::new(None),
            lifecycle: Mutex::new(()),
            shutdowns_in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            on_overflow: Some(callback),
        }
    }

    /// Return the running backend, starting one from `config` if there is none
    ///
    /// Idempotent: while a backend runs, `config` is ignored. A backend that
    /// has been shut down is replaced by a fresh one once its shutdown has
    /// returned; until then this fails with [`LoggerError::BackendStopped`].
    pub fn ensure_started(&self, config: &AsyncConfig) -> Result<Arc<AsyncBackend>> {
        if let Some(backend) = self.current() {
            return Ok(backend);
        }

        let _lifecycle = self.lifecycle.lock();
        if let Some(backend) = self.current() {
            return Ok(backend);
        }
        if self.shutdowns_in_flight.load(Ordering::Acquire) > 0 {
            return Err(LoggerError::BackendStopped);
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let backend = AsyncBackend::start(config.clone(), generation, self.on_overflow.clone())?;
        self.current.store(Some(Arc::clone(&backend)));
        Ok(backend)
    }

    /// The running backend, if any
    pub fn current(&self) -> Option<Arc<AsyncBackend>> {
        self.current.load_full().filter(|b| b.is_running())
    }

    pub fn is_running(&self) -> bool {
        let current = self.current.load();
        matches!(&*current, Some(backend) if backend.is_running())
    }

    /// Number of backends started so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Queue an entry, starting the backend if needed
    ///
    /// Fails with [`LoggerError::BackendStopped`] while a shutdown is in
    /// progress so the caller can write the entry itself.
    pub fn submit(
        &self,
        config: &AsyncConfig,
        entry: QueueEntry,
    ) -> std::result::Result<PushOutcome, SubmitError> {
        let entry = {
            let current = self.current.load();
            match &*current {
                Some(backend) => match backend.submit(entry) {
                    Ok(outcome) => return Ok(outcome),
                    Err(back) => back,
                },
                None => entry,
            }
        };

        let backend = match self.ensure_started(config) {
            Ok(backend) => backend,
            Err(error) => return Err(SubmitError { error, entry }),
        };
        backend.submit(entry).map_err(|entry| SubmitError {
            error: LoggerError::BackendStopped,
            entry,
        })
    }

    /// Stats of the running backend, else of the last one shut down
    pub fn stats(&self) -> BackendStats {
        let backend = self.current.load_full().or_else(|| self.retired.lock().clone());
        match backend {
            Some(backend) => backend.stats(),
            None => BackendStats::idle(),
        }
    }

    /// Stop the running backend and wait up to `timeout` for it to drain
    ///
    /// Returns `true` when there was nothing to stop or every worker finished
    /// in time. Safe to call concurrently: all callers observe the same
    /// shutdown. Entries submitted meanwhile are handed back to the caller.
    /// Afterwards the controller is reset and the next `ensure_started`
    /// creates a new backend.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let backend = {
            let _lifecycle = self.lifecycle.lock();
            let Some(backend) = self.current.load_full() else {
                return true;
            };
            self.shutdowns_in_flight.fetch_add(1, Ordering::AcqRel);
            backend
        };

        let drained = backend.shutdown(timeout);

        let _lifecycle = self.lifecycle.lock();
        let is_current = matches!(&*self.current.load(), Some(b) if Arc::ptr_eq(b, &backend));
        if is_current {
            self.current.store(None);
            *self.retired.lock() = Some(backend);
        }
        self.shutdowns_in_flight.fetch_sub(1, Ordering::AcqRel);
        drained
    }

    /// Shut down, then start a fresh backend from `config`
    pub fn restart(&self, config: &AsyncConfig, timeout: Duration) -> Result<Arc<AsyncBackend>> {
        if !self.shutdown(timeout) {
            diagnostics::warn("async", "previous backend did not drain before restart");
        }
        self.ensure_started(config)
    }
}

impl std::fmt::Debug for BackendController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendController")
            .field("generation", &self.generation())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for BackendController {
    fn drop(&mut self) {
        if !self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT) {
            diagnostics::warn("async", "backend did not drain before the controller was dropped");
        }
        let stats = self.stats();
        if stats.dropped() > 0 {
            diagnostics::warn(
                "async",
                &format!("controller dropped with {} entries lost to overflow", stats.dropped()),
            );
        }
    }
}

static GLOBAL: OnceLock<Arc<BackendController>> = OnceLock::new();

/// The process-wide controller used by async loggers that were not given one
pub fn global() -> Arc<BackendController> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(BackendController::new())))
}

/// Shut down the process-wide backend; call before process exit
pub fn shutdown_async_logging(timeout: Duration) -> bool {
    match GLOBAL.get() {
        Some(controller) => controller.shutdown(timeout),
        None => true,
    }
}

/// Stats of the process-wide backend
pub fn async_stats() -> BackendStats {
    match GLOBAL.get() {
        Some(controller) => controller.stats(),
        None => BackendStats::idle(),
    }
}
