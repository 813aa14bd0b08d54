//! Async delivery: a bounded queue drained by a pool of worker threads
//!
//! Producers push formatted lines (or records, with deferred formatting) and
//! return immediately. Workers batch entries and hand them to the owning
//! pipeline's writers. Overflow is resolved by the configured
//! [`OverflowStrategy`](crate::core::OverflowStrategy) and only ever shows up
//! in the counters.

mod backend;
mod config;
mod controller;
mod queue;
mod stats;
mod worker;

pub use backend::AsyncBackend;
pub use config::{AsyncConfig, AsyncConfigBuilder, MAX_WORKERS};
pub use controller::{
    async_stats, global, shutdown_async_logging, BackendController, SubmitError,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use queue::{AsyncQueue, Payload, PushOutcome, QueueEntry};
pub use stats::{BackendStats, WorkerStatus};
pub use worker::WorkerState;
