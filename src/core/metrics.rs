//! Counters for pipeline and backend observability
//!
//! All counters are relaxed atomics: they are read for monitoring, never used
//! to synchronize other memory.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-pipeline stage counters
///
/// # Example
///
/// ```
/// use pipeline_logger::core::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
/// metrics.record_written();
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Records rejected by the level gate
    gated: AtomicU64,

    /// Records rejected by a filter
    filtered: AtomicU64,

    /// Records rendered to a string
    rendered: AtomicU64,

    /// Payloads handed to the writer stage
    written: AtomicU64,

    enricher_failures: AtomicU64,
    filter_failures: AtomicU64,

    /// Formatter failures that fell back to the minimal format
    formatter_fallbacks: AtomicU64,

    writer_failures: AtomicU64,
}

macro_rules! counter {
    ($field:ident, $record:ident) => {
        #[inline]
        pub fn $field(&self) -> u64 {
            self.$field.load(Ordering::Relaxed)
        }

        #[inline]
        pub fn $record(&self) -> u64 {
            self.$field.fetch_add(1, Ordering::Relaxed)
        }
    };
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            gated: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            rendered: AtomicU64::new(0),
            written: AtomicU64::new(0),
            enricher_failures: AtomicU64::new(0),
            filter_failures: AtomicU64::new(0),
            formatter_fallbacks: AtomicU64::new(0),
            writer_failures: AtomicU64::new(0),
        }
    }

    counter!(gated, record_gated);
    counter!(filtered, record_filtered);
    counter!(rendered, record_rendered);
    counter!(written, record_written);
    counter!(enricher_failures, record_enricher_failure);
    counter!(filter_failures, record_filter_failure);
    counter!(formatter_fallbacks, record_formatter_fallback);
    counter!(writer_failures, record_writer_failure);
}

/// Counters shared by an async backend's queue and workers
#[derive(Debug, Default)]
pub struct BackendMetrics {
    /// Entries accepted onto the queue
    enqueued: AtomicU64,

    /// Entries taken off the queue and handed to the writer stage
    processed: AtomicU64,

    /// Entries lost to the overflow strategy (evicted or rejected)
    dropped: AtomicU64,

    /// Number of times a producer found the queue full
    queue_full_events: AtomicU64,

    /// Number of times a producer waited for space under `block`
    block_events: AtomicU64,

    /// Batches whose processing failed and were reported
    batch_failures: AtomicU64,
}

impl BackendMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            batch_failures: AtomicU64::new(0),
        }
    }

    counter!(enqueued, record_enqueued);
    counter!(dropped, record_dropped);
    counter!(queue_full_events, record_queue_full);
    counter!(block_events, record_block);
    counter!(batch_failures, record_batch_failure);

    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_processed(&self, count: u64) -> u64 {
        self.processed.fetch_add(count, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been submitted.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped() as f64;
        let total = self.enqueued() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued(),
            processed: self.processed(),
            dropped: self.dropped(),
            queue_full_events: self.queue_full_events(),
            block_events: self.block_events(),
            batch_failures: self.batch_failures(),
        }
    }
}

/// Point-in-time copy of [`BackendMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub enqueued: u64,
    pub processed: u64,
    pub dropped: u64,
    pub queue_full_events: u64,
    pub block_events: u64,
    pub batch_failures: u64,
}
