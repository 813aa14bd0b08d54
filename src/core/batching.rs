//! Per-thread output buffers for batched loggers
//!
//! Each thread keeps one buffer per batched logger. Lines are written as a
//! single payload once the buffer reaches the logger's batch size, on an
//! explicit flush, when the logger is dropped, and when the thread exits.

use super::pipeline::Pipeline;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

struct ThreadBuffer {
    lines: Vec<String>,
    sink: Weak<Pipeline>,
}

impl ThreadBuffer {
    fn take_payload(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let payload = self.lines.join("\n");
        self.lines.clear();
        Some(payload)
    }
}

impl Drop for ThreadBuffer {
    // runs at thread exit for whatever the thread never flushed
    fn drop(&mut self) {
        if let (Some(payload), Some(pipeline)) = (self.take_payload(), self.sink.upgrade()) {
            pipeline.write(&payload);
        }
    }
}

thread_local! {
    static BUFFERS: RefCell<HashMap<u64, ThreadBuffer>> = RefCell::new(HashMap::new());
}

/// Append a line to this thread's buffer for `logger_id`, writing the buffer
/// out once it holds `batch_size` lines
pub(crate) fn append(logger_id: u64, batch_size: usize, pipeline: &Arc<Pipeline>, line: String) {
    let mut line = Some(line);
    let full = BUFFERS.try_with(|buffers| {
        let mut buffers = buffers.borrow_mut();
        if !buffers.contains_key(&logger_id) {
            buffers.retain(|_, b| b.sink.strong_count() > 0);
        }
        let buffer = buffers.entry(logger_id).or_insert_with(|| ThreadBuffer {
            lines: Vec::with_capacity(batch_size),
            sink: Arc::downgrade(pipeline),
        });
        buffer.lines.extend(line.take());
        if buffer.lines.len() >= batch_size {
            buffer.take_payload()
        } else {
            None
        }
    });

    match full {
        // written outside the borrow so a writer may log on this thread
        Ok(Some(payload)) => pipeline.write(&payload),
        Ok(None) => {}
        // thread is tearing down its locals: write through unbatched
        Err(_) => {
            if let Some(line) = line {
                pipeline.write(&line);
            }
        }
    }
}

/// Take this thread's pending lines for `logger_id` as one payload
pub(crate) fn take(logger_id: u64) -> Option<String> {
    BUFFERS
        .try_with(|buffers| {
            buffers
                .borrow_mut()
                .get_mut(&logger_id)
                .and_then(ThreadBuffer::take_payload)
        })
        .ok()
        .flatten()
}

/// Number of lines this thread holds for `logger_id`
pub(crate) fn pending(logger_id: u64) -> usize {
    BUFFERS
        .try_with(|buffers| buffers.borrow().get(&logger_id).map_or(0, |b| b.lines.len()))
        .unwrap_or(0)
}
