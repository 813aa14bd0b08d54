//! Built-in filters

use crate::core::{Filter, LogLevel, LoggerError, Record, Result};
use rand::Rng;

/// Passes records whose level lies in `[min, max]`
#[derive(Debug, Clone, Copy)]
pub struct LevelRangeFilter {
    min: LogLevel,
    max: LogLevel,
}

impl LevelRangeFilter {
    pub fn new(min: LogLevel, max: LogLevel) -> Result<Self> {
        if min > max {
            return Err(LoggerError::config(
                "LevelRangeFilter",
                format!("min level {} is above max level {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }
}

impl Filter for LevelRangeFilter {
    fn filter(&self, record: &Record) -> Result<bool> {
        Ok((self.min..=self.max).contains(&record.level()))
    }

    fn name(&self) -> &str {
        "level_range"
    }
}

/// Allows or denies records by logger-name prefix
///
/// A record passes if it matches an allow prefix (or no allow prefixes are
/// configured) and matches no deny prefix.
#[derive(Debug, Clone, Default)]
pub struct LoggerNameFilter {
    allow: Vec<String>,
    deny: Vec<String>,
}

impl LoggerNameFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow(mut self, prefix: impl Into<String>) -> Self {
        self.allow.push(prefix.into());
        self
    }

    #[must_use]
    pub fn deny(mut self, prefix: impl Into<String>) -> Self {
        self.deny.push(prefix.into());
        self
    }
}

impl Filter for LoggerNameFilter {
    fn filter(&self, record: &Record) -> Result<bool> {
        let name = record.logger_name();
        let allowed = self.allow.is_empty() || self.allow.iter().any(|p| name.starts_with(p.as_str()));
        let denied = self.deny.iter().any(|p| name.starts_with(p.as_str()));
        Ok(allowed && !denied)
    }

    fn name(&self) -> &str {
        "logger_name"
    }
}

/// Random sampling for high-volume loggers
///
/// Records at an always-pass level are never sampled out.
#[derive(Debug, Clone)]
pub struct SamplingFilter {
    rate: f64,
    always_pass: Vec<LogLevel>,
}

impl SamplingFilter {
    /// `rate` must lie in `0.0..=1.0`; ERROR and CRITICAL always pass
    pub fn new(rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LoggerError::config(
                "SamplingFilter",
                format!("rate must be between 0.0 and 1.0, got {}", rate),
            ));
        }
        Ok(Self {
            rate,
            always_pass: vec![LogLevel::Error, LogLevel::Critical],
        })
    }

    #[must_use]
    pub fn with_always_pass(mut self, levels: Vec<LogLevel>) -> Self {
        self.always_pass = levels;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Filter for SamplingFilter {
    fn filter(&self, record: &Record) -> Result<bool> {
        if self.always_pass.contains(&record.level()) || self.rate >= 1.0 {
            return Ok(true);
        }
        if self.rate <= 0.0 {
            return Ok(false);
        }
        Ok(rand::thread_rng().gen::<f64>() < self.rate)
    }

    fn name(&self) -> &str {
        "sampling"
    }
}
