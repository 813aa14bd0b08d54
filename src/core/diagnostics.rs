//! Fallback diagnostic channel
//!
//! The logger cannot report its own failures through itself. Every error that
//! is swallowed inside the pipeline or the async workers goes through this
//! module, which writes to the process's stderr. Nothing here may panic.

use super::error::{LoggerError, Result};
use std::any::Any;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Drop alerts after the first are only printed every this many drops
pub const DROP_ALERT_INTERVAL: u64 = 1000;

fn emit(prefix: &str, component: &str, message: &dyn std::fmt::Display) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "[LOGGER {}] {}: {}", prefix, component, message);
}

/// Report a swallowed error
pub fn report(component: &str, error: &LoggerError) {
    emit("ERROR", component, error);
}

/// Report a condition that is not an error but deserves operator attention
pub fn warn(component: &str, message: &str) {
    emit("WARNING", component, &message);
}

/// Whether the `dropped_so_far`-th drop (1-based) should raise an alert
pub fn should_alert_drop(dropped_so_far: u64) -> bool {
    dropped_so_far == 1 || dropped_so_far % DROP_ALERT_INTERVAL == 0
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run a user-supplied stage, converting a panic into an error
pub fn guard<T>(stage: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::panicked(stage, panic_message(payload.as_ref()))),
    }
}
