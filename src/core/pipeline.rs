//! Enrich → filter → format → write evaluation over a record
//!
//! A [`Pipeline`] is built once from a [`PipelineConfig`] and never changes.
//! This is the boundary where stage failures stop: errors and panics raised by
//! user-supplied enrichers, filters, formatters and writers are converted to
//! reports on the fallback channel and never reach the caller.

use super::diagnostics;
use super::log_level::LogLevel;
use super::metrics::PipelineMetrics;
use super::record::Record;
use super::stages::{Enricher, Filter, Formatter};
use super::writer::Writer;
use crate::formatters::TextFormatter;
use std::fmt;
use std::sync::Arc;

/// Immutable description of a pipeline
#[derive(Clone)]
pub struct PipelineConfig {
    min_level: LogLevel,
    enrichers: Vec<Arc<dyn Enricher>>,
    filters: Vec<Arc<dyn Filter>>,
    formatter: Arc<dyn Formatter>,
    writers: Vec<Arc<dyn Writer>>,
}

impl PipelineConfig {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enricher_count(&self) -> usize {
        self.enrichers.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn writer_names(&self) -> Vec<String> {
        self.writers.iter().map(|w| w.name().to_string()).collect()
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("min_level", &self.min_level)
            .field("enrichers", &self.enrichers.len())
            .field("filters", &self.filters.len())
            .field("formatter", &self.formatter.name())
            .field("writers", &self.writer_names())
            .finish()
    }
}

/// Builder for [`PipelineConfig`] and [`Pipeline`]
///
/// # Example
///
/// ```
/// use pipeline_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryWriter::new());
/// let pipeline = Pipeline::builder()
///     .min_level(LogLevel::Debug)
///     .formatter(JsonFormatter::new())
///     .shared_writer(memory.clone())
///     .build();
///
/// pipeline.process(Record::new(LogLevel::Info, "app", "hello"));
/// assert_eq!(memory.len(), 1);
/// ```
pub struct PipelineBuilder {
    min_level: LogLevel,
    enrichers: Vec<Arc<dyn Enricher>>,
    filters: Vec<Arc<dyn Filter>>,
    formatter: Option<Arc<dyn Formatter>>,
    writers: Vec<Arc<dyn Writer>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            enrichers: Vec::new(),
            filters: Vec::new(),
            formatter: None,
            writers: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Append an enricher; enrichers run in insertion order
    #[must_use = "builder methods return a new value"]
    pub fn enricher<E: Enricher + 'static>(mut self, enricher: E) -> Self {
        self.enrichers.push(Arc::new(enricher));
        self
    }

    /// Append a filter; filters run in insertion order and short-circuit
    #[must_use = "builder methods return a new value"]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Set the formatter (defaults to [`TextFormatter`])
    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn writer<W: Writer + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Arc::new(writer));
        self
    }

    /// Add a writer the caller keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_writer(mut self, writer: Arc<dyn Writer>) -> Self {
        self.writers.push(writer);
        self
    }

    pub fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            min_level: self.min_level,
            enrichers: self.enrichers,
            filters: self.filters,
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(TextFormatter::new())),
            writers: self.writers,
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.into_config())
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    /// `config.min_level` as an integer for the hot-path gate
    min_level: u8,
    metrics: PipelineMetrics,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            min_level: config.min_level.as_u8(),
            config,
            metrics: PipelineMetrics::new(),
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn min_level(&self) -> LogLevel {
        self.config.min_level
    }

    /// Level gate: a single integer comparison
    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.min_level
    }

    /// Run the full pipeline: render, then hand the result to every writer
    ///
    /// Returns the formatted line, or `None` when the record was gated or
    /// filtered out.
    pub fn process(&self, record: Record) -> Option<String> {
        let line = self.render(record)?;
        self.write(&line);
        Some(line)
    }

    /// Level gate, enrichers, filters and formatter, without writing
    pub fn render(&self, record: Record) -> Option<String> {
        if !self.accepts(record.level()) {
            self.metrics.record_gated();
            return None;
        }

        let record = self.enrich(record);

        if !self.passes_filters(&record) {
            self.metrics.record_filtered();
            return None;
        }

        self.metrics.record_rendered();
        Some(self.format(&record))
    }

    fn enrich(&self, mut record: Record) -> Record {
        for enricher in &self.config.enrichers {
            match diagnostics::guard(enricher.name(), || enricher.enrich(&record)) {
                Ok(next) => record = next,
                Err(e) => {
                    self.metrics.record_enricher_failure();
                    diagnostics::report("pipeline", &e);
                }
            }
        }
        record
    }

    /// Filters fail open: an erroring filter lets the record through
    fn passes_filters(&self, record: &Record) -> bool {
        for filter in &self.config.filters {
            match diagnostics::guard(filter.name(), || filter.filter(record)) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    self.metrics.record_filter_failure();
                    diagnostics::report("pipeline", &e);
                }
            }
        }
        true
    }

    /// Formatter output, or the minimal fallback when the formatter fails
    pub fn format(&self, record: &Record) -> String {
        let formatter = &self.config.formatter;
        match diagnostics::guard(formatter.name(), || formatter.format(record)) {
            Ok(line) => line,
            Err(e) => {
                self.metrics.record_formatter_fallback();
                diagnostics::report("pipeline", &e);
                fallback_format(record)
            }
        }
    }

    /// Deliver a payload to every writer; one writer's failure never stops
    /// the others
    pub fn write(&self, payload: &str) {
        self.metrics.record_written();
        for writer in &self.config.writers {
            if let Err(e) = diagnostics::guard(writer.name(), || writer.write(payload)) {
                self.metrics.record_writer_failure();
                diagnostics::report("pipeline", &e);
            }
        }
    }

    /// Flush every writer, reporting failures
    pub fn flush(&self) {
        for writer in &self.config.writers {
            if let Err(e) = diagnostics::guard(writer.name(), || writer.flush()) {
                self.metrics.record_writer_failure();
                diagnostics::report("pipeline", &e);
            }
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("config", &self.config).finish()
    }
}

/// Level and message only; used when the configured formatter fails
pub fn fallback_format(record: &Record) -> String {
    format!("{} {}", record.level(), record.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, LoggerError, Result};
    use crate::writers::MemoryWriter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(level: LogLevel, message: &str) -> Record {
        Record::new(level, "test", message)
    }

    #[test]
    fn test_level_gate_skips_every_stage() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c1, c2, c3, c4) = (calls.clone(), calls.clone(), calls.clone(), calls.clone());

        let pipeline = Pipeline::builder()
            .min_level(LogLevel::Warning)
            .enricher(move |r: &Record| -> Result<Record> {
                c1.fetch_add(1, Ordering::SeqCst);
                Ok(r.clone())
            })
            .filter(move |_: &Record| -> Result<bool> {
                c2.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .formatter(move |r: &Record| -> Result<String> {
                c3.fetch_add(1, Ordering::SeqCst);
                Ok(r.message().to_string())
            })
            .writer(move |_: &str| -> Result<()> {
                c4.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        assert!(pipeline.process(record(LogLevel::Debug, "d")).is_none());
        assert!(pipeline.process(record(LogLevel::Info, "i")).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.metrics().gated(), 2);

        assert!(pipeline.process(record(LogLevel::Error, "e")).is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_enrichers_run_in_order() {
        let memory = Arc::new(MemoryWriter::new());
        let pipeline = Pipeline::builder()
            .enricher(|r: &Record| -> Result<Record> { Ok(r.clone().with_field("step", "one")) })
            .enricher(|r: &Record| -> Result<Record> { Ok(r.clone().with_field("step", "two")) })
            .formatter(|r: &Record| -> Result<String> { Ok(r.fields().format_pairs()) })
            .shared_writer(memory.clone())
            .build();

        pipeline.process(record(LogLevel::Info, "m"));
        assert_eq!(memory.lines(), vec!["step=two".to_string()]);
    }

    #[test]
    fn test_failing_enricher_is_skipped() {
        let pipeline = Pipeline::builder()
            .enricher(|_: &Record| -> Result<Record> { Err(LoggerError::enricher("bad", "nope")) })
            .enricher(|_: &Record| -> Result<Record> { panic!("enricher panic") })
            .enricher(|r: &Record| -> Result<Record> { Ok(r.clone().with_field("ok", true)) })
            .formatter(|r: &Record| -> Result<String> {
                Ok(format!("{} {}", r.message(), r.fields().format_pairs()))
            })
            .build();

        let line = pipeline.process(record(LogLevel::Info, "kept")).unwrap();
        assert_eq!(line, "kept ok=true");
        assert_eq!(pipeline.metrics().enricher_failures(), 2);
    }

    #[test]
    fn test_filter_short_circuits() {
        let later = Arc::new(AtomicUsize::new(0));
        let later_clone = later.clone();
        let pipeline = Pipeline::builder()
            .filter(|r: &Record| -> Result<bool> { Ok(r.message() != "drop me") })
            .filter(move |_: &Record| -> Result<bool> {
                later_clone.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .build();

        assert!(pipeline.render(record(LogLevel::Info, "drop me")).is_none());
        assert_eq!(later.load(Ordering::SeqCst), 0);
        assert!(pipeline.render(record(LogLevel::Info, "keep me")).is_some());
        assert_eq!(later.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.metrics().filtered(), 1);
    }

    #[test]
    fn test_filter_fails_open() {
        let memory = Arc::new(MemoryWriter::new());
        let pipeline = Pipeline::builder()
            .filter(|r: &Record| -> Result<bool> {
                if r.message() == "poison" {
                    Err(LoggerError::filter("picky", "cannot decide"))
                } else {
                    Ok(true)
                }
            })
            .filter(|r: &Record| -> Result<bool> {
                if r.message() == "panic" {
                    panic!("filter panic");
                }
                Ok(true)
            })
            .formatter(|r: &Record| -> Result<String> { Ok(r.message().to_string()) })
            .shared_writer(memory.clone())
            .build();

        pipeline.process(record(LogLevel::Info, "poison"));
        pipeline.process(record(LogLevel::Info, "panic"));

        assert_eq!(memory.lines(), vec!["poison".to_string(), "panic".to_string()]);
        assert_eq!(pipeline.metrics().filter_failures(), 2);
    }

    #[test]
    fn test_formatter_failure_uses_fallback() {
        let pipeline = Pipeline::builder()
            .formatter(|_: &Record| -> Result<String> { Err(LoggerError::formatter("broken", "x")) })
            .build();

        let r = record(LogLevel::Warning, "disk low").with_fields(Fields::new().with("pct", 97));
        let line = pipeline.process(r).unwrap();
        assert_eq!(line, "WARNING disk low");
        assert_eq!(pipeline.metrics().formatter_fallbacks(), 1);
    }

    #[test]
    fn test_writer_failure_isolated() {
        let first = Arc::new(MemoryWriter::new());
        let last = Arc::new(MemoryWriter::new());
        let pipeline = Pipeline::builder()
            .shared_writer(first.clone())
            .writer(|_: &str| -> Result<()> { Err(LoggerError::writer("broken", "always fails")) })
            .writer(|_: &str| -> Result<()> { panic!("writer panic") })
            .shared_writer(last.clone())
            .build();

        for i in 0..3 {
            pipeline.process(record(LogLevel::Info, &format!("message {}", i)));
        }

        assert_eq!(first.len(), 3);
        assert_eq!(last.len(), 3);
        assert_eq!(pipeline.metrics().writer_failures(), 6);
    }
}
