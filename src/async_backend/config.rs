//! Async backend configuration

use crate::core::{LoggerError, OverflowStrategy, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on the worker pool size
pub const MAX_WORKERS: usize = 256;

/// Immutable configuration of a queue and its worker pool
///
/// Durations serialize as integer milliseconds.
///
/// # Example
///
/// ```
/// use pipeline_logger::async_backend::AsyncConfig;
/// use pipeline_logger::core::OverflowStrategy;
/// use std::time::Duration;
///
/// let config = AsyncConfig::builder()
///     .max_queue_size(1024)
///     .worker_count(2)
///     .batch_size(64)
///     .batch_timeout(Duration::from_millis(20))
///     .overflow_strategy(OverflowStrategy::DropOldest)
///     .build()
///     .unwrap();
/// assert_eq!(config.worker_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncConfig {
    max_queue_size: usize,
    worker_count: usize,
    batch_size: usize,
    #[serde(rename = "batch_timeout_ms", with = "duration_ms")]
    batch_timeout: Duration,
    overflow_strategy: OverflowStrategy,
    enable_batching: bool,
    #[serde(rename = "block_timeout_ms", with = "duration_ms")]
    block_timeout: Duration,
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    poll_interval: Duration,
    defer_formatting: bool,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10_000,
            worker_count: 1,
            batch_size: 50,
            batch_timeout: Duration::from_millis(10),
            overflow_strategy: OverflowStrategy::DropNewest,
            enable_batching: true,
            block_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
            defer_formatting: false,
        }
    }
}

impl AsyncConfig {
    pub fn builder() -> AsyncConfigBuilder {
        AsyncConfigBuilder {
            config: AsyncConfig::default(),
        }
    }

    /// Parse and validate a JSON document; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AsyncConfig = serde_json::from_str(json)
            .map_err(|e| LoggerError::config("AsyncConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(LoggerError::config("AsyncConfig", message));

        if self.max_queue_size == 0 {
            return fail("max_queue_size must be greater than 0".into());
        }
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return fail(format!(
                "worker_count must be between 1 and {}, got {}",
                MAX_WORKERS, self.worker_count
            ));
        }
        if self.enable_batching && self.batch_size == 0 {
            return fail("batch_size must be greater than 0".into());
        }
        if self.enable_batching && self.batch_timeout.is_zero() {
            return fail("batch_timeout must be greater than 0".into());
        }
        if self.poll_interval.is_zero() {
            return fail("poll_interval must be greater than 0".into());
        }
        if self.overflow_strategy == OverflowStrategy::Block && self.block_timeout.is_zero() {
            return fail("block_timeout must be greater than 0 for the block strategy".into());
        }
        Ok(())
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batch size the workers actually use: 1 when batching is disabled
    pub fn effective_batch_size(&self) -> usize {
        if self.enable_batching {
            self.batch_size
        } else {
            1
        }
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    pub fn overflow_strategy(&self) -> OverflowStrategy {
        self.overflow_strategy
    }

    pub fn enable_batching(&self) -> bool {
        self.enable_batching
    }

    pub fn block_timeout(&self) -> Duration {
        self.block_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn defer_formatting(&self) -> bool {
        self.defer_formatting
    }
}

/// Builder for [`AsyncConfig`]; `build()` validates
pub struct AsyncConfigBuilder {
    config: AsyncConfig,
}

impl AsyncConfigBuilder {
    #[must_use = "builder methods return a new value"]
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn batch_timeout(mut self, timeout: Duration) -> Self {
        self.config.batch_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_strategy(mut self, strategy: OverflowStrategy) -> Self {
        self.config.overflow_strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enable_batching(mut self, enabled: bool) -> Self {
        self.config.enable_batching = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn block_timeout(mut self, timeout: Duration) -> Self {
        self.config.block_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Enqueue records and render them on the worker threads
    #[must_use = "builder methods return a new value"]
    pub fn defer_formatting(mut self, defer: bool) -> Self {
        self.config.defer_formatting = defer;
        self
    }

    pub fn build(self) -> Result<AsyncConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
