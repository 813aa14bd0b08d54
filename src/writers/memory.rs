//! In-memory and discarding writers

use crate::core::{Result, Writer};
use parking_lot::Mutex;

/// Keeps every payload in memory
///
/// Useful for tests and for hosts that ship logs elsewhere on their own
/// schedule.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    payloads: Mutex<Vec<String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each `write` call as received
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().clone()
    }

    /// Every line across all payloads, in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.payloads
            .lock()
            .iter()
            .flat_map(|p| p.lines().map(str::to_string))
            .collect()
    }

    /// Number of `write` calls received
    pub fn write_count(&self) -> usize {
        self.payloads.lock().len()
    }

    /// Number of lines received
    pub fn len(&self) -> usize {
        self.payloads.lock().iter().map(|p| p.lines().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.lock().is_empty()
    }

    pub fn clear(&self) {
        self.payloads.lock().clear();
    }
}

impl Writer for MemoryWriter {
    fn write(&self, payload: &str) -> Result<()> {
        self.payloads.lock().push(payload.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWriter;

impl Writer for NullWriter {
    fn write(&self, _payload: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
