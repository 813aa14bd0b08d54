//! Named loggers and ready-made pipelines
//!
//! `get_logger` and `get_async_logger` hand out one logger per name, created on
//! first request with a console pipeline at the default level. Changing the
//! default level affects loggers created afterwards only.

use crate::core::{LogLevel, Logger, Pipeline, Result};
use crate::formatters::TextFormatter;
use crate::writers::{ConsoleWriter, FileWriter};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Sync,
    Async,
}

static DEFAULT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

fn loggers() -> &'static RwLock<HashMap<(String, Kind), Logger>> {
    static LOGGERS: OnceLock<RwLock<HashMap<(String, Kind), Logger>>> = OnceLock::new();
    LOGGERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Level given to registry loggers created from now on
pub fn set_default_level(level: LogLevel) {
    DEFAULT_LEVEL.store(level.as_u8(), Ordering::Relaxed);
}

pub fn default_level() -> LogLevel {
    LogLevel::try_from(DEFAULT_LEVEL.load(Ordering::Relaxed)).unwrap_or_default()
}

/// Synchronous logger for `name`, created on first use
///
/// # Example
///
/// ```
/// use pipeline_logger::registry::get_logger;
///
/// let a = get_logger("payments");
/// let b = get_logger("payments");
/// assert_eq!(a.name(), b.name());
/// assert!(std::sync::Arc::ptr_eq(a.pipeline(), b.pipeline()));
/// ```
pub fn get_logger(name: &str) -> Logger {
    get_or_create(name, Kind::Sync)
}

/// Async logger for `name` on the process-wide backend, created on first use
///
/// Call [`shutdown_async_logging`](crate::async_backend::shutdown_async_logging)
/// before exit to drain it.
pub fn get_async_logger(name: &str) -> Logger {
    get_or_create(name, Kind::Async)
}

fn get_or_create(name: &str, kind: Kind) -> Logger {
    let key = (name.to_string(), kind);
    if let Some(logger) = loggers().read().get(&key) {
        return logger.clone();
    }

    let mut map = loggers().write();
    map.entry(key)
        .or_insert_with(|| create(name, kind))
        .clone()
}

fn create(name: &str, kind: Kind) -> Logger {
    Logger::for_registry(name, console_pipeline(default_level()), kind == Kind::Async)
}

/// Text to stdout, colored when the `console` feature is on
pub fn console_pipeline(min_level: LogLevel) -> Pipeline {
    Pipeline::builder()
        .min_level(min_level)
        .formatter(TextFormatter::new().with_colors(cfg!(feature = "console")))
        .writer(ConsoleWriter::new())
        .build()
}

/// Plain text appended to `path`
pub fn file_pipeline(path: impl AsRef<Path>, min_level: LogLevel) -> Result<Pipeline> {
    let writer = FileWriter::new(path.as_ref())?;
    Ok(Pipeline::builder()
        .min_level(min_level)
        .formatter(TextFormatter::new())
        .writer(writer)
        .build())
}
