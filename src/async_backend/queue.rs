//! Bounded MPMC queue with overflow handling

use crate::core::{BackendMetrics, OverflowStrategy, Pipeline, Record};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Eviction rounds attempted under `drop_oldest` before giving up
///
/// Competing producers can refill the slot we just freed; after this many
/// rounds the incoming entry is dropped instead.
const EVICTION_ATTEMPTS: usize = 8;

/// What travels through the queue
#[derive(Debug)]
pub enum Payload {
    /// Already rendered on the producer thread
    Formatted(String),
    /// Rendered by the worker
    Record(Record),
}

/// A unit of work for the workers: a payload plus the pipeline that writes it
pub struct QueueEntry {
    enqueued_at: Instant,
    payload: Payload,
    pipeline: Arc<Pipeline>,
}

impl QueueEntry {
    pub fn formatted(line: String, pipeline: Arc<Pipeline>) -> Self {
        Self {
            enqueued_at: Instant::now(),
            payload: Payload::Formatted(line),
            pipeline,
        }
    }

    pub fn record(record: Record, pipeline: Arc<Pipeline>) -> Self {
        Self {
            enqueued_at: Instant::now(),
            payload: Payload::Record(record),
            pipeline,
        }
    }

    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Render the payload if needed; `None` when a filter rejected the record
    pub(crate) fn into_line(self) -> Option<String> {
        match self.payload {
            Payload::Formatted(line) => Some(line),
            Payload::Record(record) => self.pipeline.render(record),
        }
    }

    /// Write synchronously on the calling thread, bypassing the queue
    pub(crate) fn deliver_now(self) {
        let pipeline = Arc::clone(&self.pipeline);
        if let Some(line) = self.into_line() {
            pipeline.write(&line);
        }
    }
}

impl std::fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEntry")
            .field("enqueued_at", &self.enqueued_at)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// Result of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted without loss
    Accepted,
    /// Accepted after evicting the oldest entry
    AcceptedAfterEviction,
    /// The incoming entry was dropped
    Rejected,
    /// `block` waited the full timeout and the entry was dropped
    TimedOut,
}

impl PushOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PushOutcome::Accepted | PushOutcome::AcceptedAfterEviction)
    }

    /// Whether this push lost an entry (either the incoming or an evicted one)
    pub fn lost_entry(&self) -> bool {
        !matches!(self, PushOutcome::Accepted)
    }
}

/// Bounded queue shared by producers and workers
///
/// The queue keeps its own receiver so that `drop_oldest` can evict from the
/// head. Counters are updated here, at the point where the outcome is known.
pub struct AsyncQueue {
    sender: Sender<QueueEntry>,
    receiver: Receiver<QueueEntry>,
    capacity: usize,
    strategy: OverflowStrategy,
    block_timeout: Duration,
    metrics: Arc<BackendMetrics>,
}

impl AsyncQueue {
    pub fn new(
        capacity: usize,
        strategy: OverflowStrategy,
        block_timeout: Duration,
        metrics: Arc<BackendMetrics>,
    ) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            strategy,
            block_timeout,
            metrics,
        }
    }

    pub fn push(&self, entry: QueueEntry) -> PushOutcome {
        let entry = match self.sender.try_send(entry) {
            Ok(()) => {
                self.metrics.record_enqueued();
                return PushOutcome::Accepted;
            }
            Err(TrySendError::Full(entry)) => entry,
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
                return PushOutcome::Rejected;
            }
        };

        self.metrics.record_queue_full();
        match self.strategy {
            OverflowStrategy::DropNewest => {
                self.metrics.record_dropped();
                PushOutcome::Rejected
            }
            OverflowStrategy::DropOldest => self.push_evicting(entry),
            OverflowStrategy::Block => {
                self.metrics.record_block();
                match self.sender.send_timeout(entry, self.block_timeout) {
                    Ok(()) => {
                        self.metrics.record_enqueued();
                        PushOutcome::Accepted
                    }
                    Err(SendTimeoutError::Timeout(_)) => {
                        self.metrics.record_dropped();
                        PushOutcome::TimedOut
                    }
                    Err(SendTimeoutError::Disconnected(_)) => {
                        self.metrics.record_dropped();
                        PushOutcome::Rejected
                    }
                }
            }
        }
    }

    fn push_evicting(&self, mut entry: QueueEntry) -> PushOutcome {
        let mut evicted = false;
        for _ in 0..EVICTION_ATTEMPTS {
            if self.receiver.try_recv().is_ok() {
                self.metrics.record_dropped();
                evicted = true;
            }
            match self.sender.try_send(entry) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                    return if evicted {
                        PushOutcome::AcceptedAfterEviction
                    } else {
                        PushOutcome::Accepted
                    };
                }
                Err(TrySendError::Full(back)) => entry = back,
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        self.metrics.record_dropped();
        PushOutcome::Rejected
    }

    pub fn pop_timeout(&self, timeout: Duration) -> Option<QueueEntry> {
        self.receiver.recv_timeout(timeout).ok()
    }

    pub fn try_pop(&self) -> Option<QueueEntry> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn strategy(&self) -> OverflowStrategy {
        self.strategy
    }

    pub fn metrics(&self) -> &Arc<BackendMetrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    fn pipeline() -> Arc<Pipeline> {
        Arc::new(Pipeline::builder().build())
    }

    fn queue(capacity: usize, strategy: OverflowStrategy) -> AsyncQueue {
        AsyncQueue::new(
            capacity,
            strategy,
            Duration::from_millis(20),
            Arc::new(BackendMetrics::new()),
        )
    }

    fn line(entry: QueueEntry) -> String {
        match entry.payload {
            Payload::Formatted(line) => line,
            Payload::Record(record) => record.message().to_string(),
        }
    }

    #[test]
    fn test_fifo_under_capacity() {
        let q = queue(4, OverflowStrategy::DropNewest);
        let p = pipeline();
        for i in 0..3 {
            assert_eq!(q.push(QueueEntry::formatted(i.to_string(), p.clone())), PushOutcome::Accepted);
        }
        assert_eq!(q.len(), 3);
        let drained: Vec<String> = std::iter::from_fn(|| q.try_pop()).map(line).collect();
        assert_eq!(drained, vec!["0", "1", "2"]);
        assert_eq!(q.metrics().enqueued(), 3);
    }

    #[test]
    fn test_drop_oldest_evicts_head() {
        let q = queue(3, OverflowStrategy::DropOldest);
        let p = pipeline();
        for i in 0..3 {
            q.push(QueueEntry::formatted(format!("m{}", i), p.clone()));
        }
        let outcome = q.push(QueueEntry::formatted("m3".into(), p.clone()));

        assert_eq!(outcome, PushOutcome::AcceptedAfterEviction);
        assert_eq!(q.len(), 3);
        assert_eq!(q.metrics().dropped(), 1);
        let drained: Vec<String> = std::iter::from_fn(|| q.try_pop()).map(line).collect();
        assert_eq!(drained, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_drop_newest_rejects_incoming() {
        let q = queue(2, OverflowStrategy::DropNewest);
        let p = pipeline();
        q.push(QueueEntry::formatted("a".into(), p.clone()));
        q.push(QueueEntry::formatted("b".into(), p.clone()));
        assert_eq!(q.push(QueueEntry::formatted("c".into(), p.clone())), PushOutcome::Rejected);

        assert_eq!(q.metrics().dropped(), 1);
        assert_eq!(q.metrics().queue_full_events(), 1);
        let drained: Vec<String> = std::iter::from_fn(|| q.try_pop()).map(line).collect();
        assert_eq!(drained, vec!["a", "b"]);
    }

    #[test]
    fn test_block_times_out_and_drops() {
        let q = queue(1, OverflowStrategy::Block);
        let p = pipeline();
        q.push(QueueEntry::formatted("a".into(), p.clone()));

        let start = Instant::now();
        let outcome = q.push(QueueEntry::formatted("b".into(), p));
        assert_eq!(outcome, PushOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(q.metrics().dropped(), 1);
        assert_eq!(q.metrics().block_events(), 1);
    }

    #[test]
    fn test_block_succeeds_when_space_frees() {
        let q = Arc::new(AsyncQueue::new(
            1,
            OverflowStrategy::Block,
            Duration::from_secs(2),
            Arc::new(BackendMetrics::new()),
        ));
        let p = pipeline();
        q.push(QueueEntry::formatted("a".into(), p.clone()));

        let consumer = {
            let q = Arc::clone(&q);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                q.try_pop().map(line)
            })
        };
        assert_eq!(q.push(QueueEntry::formatted("b".into(), p)), PushOutcome::Accepted);
        assert_eq!(consumer.join().unwrap().as_deref(), Some("a"));
        assert_eq!(q.metrics().dropped(), 0);
    }

    #[test]
    fn test_record_entries_render_on_demand() {
        let p = pipeline();
        let entry = QueueEntry::record(Record::new(LogLevel::Warning, "app", "late"), p);
        assert_eq!(entry.into_line().as_deref().map(|l| l.contains("late")), Some(true));
    }
}
