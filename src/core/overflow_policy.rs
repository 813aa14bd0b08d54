//! Overflow strategies for the async queue
//!
//! When the bounded queue is full, the strategy decides which entry is lost.
//! Losses are only ever visible through counters and the overflow callback;
//! producers never receive an error.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Policy for handling a full async queue
///
/// # Example
///
/// ```
/// use pipeline_logger::core::OverflowStrategy;
///
/// let strategy: OverflowStrategy = "drop_oldest".parse().unwrap();
/// assert_eq!(strategy, OverflowStrategy::DropOldest);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Wait for space, bounded by the configured block timeout, then drop
    ///
    /// Warning: this pushes backpressure onto the logging thread.
    Block,

    /// Evict the oldest queued entry to make room for the new one
    DropOldest,

    /// Discard the incoming entry
    #[default]
    DropNewest,
}

impl OverflowStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowStrategy::Block => "block",
            OverflowStrategy::DropOldest => "drop_oldest",
            OverflowStrategy::DropNewest => "drop_newest",
        }
    }
}

impl fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowStrategy {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "block" => Ok(OverflowStrategy::Block),
            "drop_oldest" => Ok(OverflowStrategy::DropOldest),
            "drop_newest" => Ok(OverflowStrategy::DropNewest),
            other => Err(LoggerError::config(
                "OverflowStrategy",
                format!("unknown strategy '{}'", other),
            )),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when entries are dropped due to queue overflow (on the first drop
/// and periodically after). The parameter is the total drop count so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
