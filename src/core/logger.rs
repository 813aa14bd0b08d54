//! Logger: the emission entry point
//!
//! A logger owns a [`Pipeline`] and a dispatch mode:
//!
//! - **direct**: the calling thread runs the pipeline and the writers
//! - **batched**: the calling thread renders, lines collect in a thread-local
//!   buffer and are written `batch_size` at a time
//! - **async**: the calling thread renders (or not, with deferred
//!   formatting) and enqueues; worker threads write
//!
//! Every mode applies the level gate first, as a single integer comparison,
//! before anything is allocated.

use super::batching;
use super::diagnostics;
use super::error::{LoggerError, Result};
use super::field::Fields;
use super::log_context::{current_context, LogContext};
use super::log_level::LogLevel;
use super::pipeline::{Pipeline, PipelineConfig};
use super::record::{ExceptionInfo, Record, SourceLocation};
use crate::async_backend::{self, AsyncConfig, BackendController, BackendStats, QueueEntry, SubmitError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);

/// How a logger delivers rendered records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerMode {
    Direct,
    Batched { batch_size: usize },
    Async,
}

enum Dispatch {
    Direct,
    Batched {
        batch_size: usize,
    },
    Async {
        controller: Arc<BackendController>,
        config: AsyncConfig,
    },
}

struct LoggerInner {
    id: u64,
    name: Arc<str>,
    pipeline: Arc<Pipeline>,
    /// copy of the pipeline's minimum level for the hot path
    min_level: u8,
    dispatch: Dispatch,
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if let Dispatch::Batched { .. } = self.dispatch {
            if let Some(payload) = batching::take(self.id) {
                self.pipeline.write(&payload);
            }
        }
    }
}

/// Named logger
///
/// Cheap to clone; clones share the pipeline, the dispatch mode and, in
/// batched mode, the per-thread buffers.
///
/// # Example
///
/// ```
/// use pipeline_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryWriter::new());
/// let logger = Logger::builder("app")
///     .pipeline(Pipeline::builder().shared_writer(memory.clone()).build())
///     .build()
///     .unwrap();
///
/// logger.info("service started");
/// logger.debug("not recorded: below INFO");
/// assert_eq!(memory.len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
    context: Option<Arc<LogContext>>,
}

impl Logger {
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    fn assemble(name: Arc<str>, pipeline: Arc<Pipeline>, dispatch: Dispatch) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                id: NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed),
                name,
                min_level: pipeline.min_level().as_u8(),
                pipeline,
                dispatch,
            }),
            context: None,
        }
    }

    /// Direct or async-on-the-global-backend logger with default settings
    pub(crate) fn for_registry(name: &str, pipeline: Pipeline, async_mode: bool) -> Logger {
        let name: Arc<str> = if name.is_empty() { Arc::from("root") } else { Arc::from(name) };
        let dispatch = if async_mode {
            Dispatch::Async {
                controller: async_backend::global(),
                config: AsyncConfig::default(),
            }
        } else {
            Dispatch::Direct
        };
        Logger::assemble(name, Arc::new(pipeline), dispatch)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.inner.pipeline
    }

    pub fn mode(&self) -> LoggerMode {
        match &self.inner.dispatch {
            Dispatch::Direct => LoggerMode::Direct,
            Dispatch::Batched { batch_size } => LoggerMode::Batched {
                batch_size: *batch_size,
            },
            Dispatch::Async { .. } => LoggerMode::Async,
        }
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.inner.min_level
    }

    /// A logger that attaches `context` to every record it emits
    ///
    /// The bound context sits above the thread's current context and below any
    /// context passed to [`log_with_context`](Self::log_with_context).
    #[must_use]
    pub fn with_context(&self, context: LogContext) -> Logger {
        let context = match &self.context {
            Some(existing) => existing.merge(&context),
            None => context,
        };
        Logger {
            inner: Arc::clone(&self.inner),
            context: Some(Arc::new(context)),
        }
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>, fields: Option<Fields>) {
        if !self.is_enabled(level) {
            return;
        }
        let record = self.build_record(level, message.as_ref(), fields, None);
        self.dispatch(record);
    }

    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: impl AsRef<str>,
        fields: Option<Fields>,
        context: &LogContext,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let record = self.build_record(level, message.as_ref(), fields, Some(context));
        self.dispatch(record);
    }

    /// Used by the logging macros to attach the call site
    pub fn log_at(
        &self,
        level: LogLevel,
        message: impl AsRef<str>,
        fields: Option<Fields>,
        location: SourceLocation,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let record = self
            .build_record(level, message.as_ref(), fields, None)
            .with_location(location);
        self.dispatch(record);
    }

    /// Emit a record built elsewhere; it still passes the level gate
    pub fn log_record(&self, record: Record) {
        if self.is_enabled(record.level()) {
            self.dispatch(record);
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message, None);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message, None);
    }

    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, message, None);
    }

    /// Log `error` at ERROR with its type, message and source chain
    pub fn exception<E>(&self, message: impl AsRef<str>, error: &E)
    where
        E: std::error::Error + ?Sized,
    {
        if !self.is_enabled(LogLevel::Error) {
            return;
        }
        let record = self
            .build_record(LogLevel::Error, message.as_ref(), None, None)
            .with_exception(ExceptionInfo::from_error(error));
        self.dispatch(record);
    }

    /// Gauge-style measurement at INFO
    pub fn metric(&self, name: &str, value: f64, unit: &str) {
        if !self.is_enabled(LogLevel::Info) {
            return;
        }
        let fields = Fields::new()
            .with("metric_type", "gauge")
            .with("metric_name", name)
            .with("metric_value", value)
            .with("metric_unit", unit);
        let message = format!("metric {}={}{}", name, value, unit);
        self.log(LogLevel::Info, message, Some(fields));
    }

    pub fn counter(&self, name: &str, increment: i64) {
        if !self.is_enabled(LogLevel::Info) {
            return;
        }
        let fields = Fields::new()
            .with("metric_type", "counter")
            .with("metric_name", name)
            .with("increment", increment);
        let message = format!("counter {} +{}", name, increment);
        self.log(LogLevel::Info, message, Some(fields));
    }

    pub fn timer(&self, name: &str, duration_ms: f64) {
        if !self.is_enabled(LogLevel::Info) {
            return;
        }
        let fields = Fields::new()
            .with("metric_type", "timer")
            .with("metric_name", name)
            .with("duration_ms", duration_ms);
        let message = format!("timer {} {}ms", name, duration_ms);
        self.log(LogLevel::Info, message, Some(fields));
    }

    /// Write out this thread's batch and flush the writers
    ///
    /// In async mode this does not wait for queued entries; use
    /// [`BackendController::shutdown`] for that.
    pub fn flush(&self) {
        if let Dispatch::Batched { .. } = self.inner.dispatch {
            if let Some(payload) = batching::take(self.inner.id) {
                self.inner.pipeline.write(&payload);
            }
        }
        self.inner.pipeline.flush();
    }

    /// Lines the calling thread holds in its batch buffer for this logger
    pub fn pending_batch_len(&self) -> usize {
        match self.inner.dispatch {
            Dispatch::Batched { .. } => batching::pending(self.inner.id),
            _ => 0,
        }
    }

    /// Stats of the backend serving this logger, in async mode
    pub fn backend_stats(&self) -> Option<BackendStats> {
        match &self.inner.dispatch {
            Dispatch::Async { controller, .. } => Some(controller.stats()),
            _ => None,
        }
    }

    fn build_record(
        &self,
        level: LogLevel,
        message: &str,
        fields: Option<Fields>,
        explicit: Option<&LogContext>,
    ) -> Record {
        let mut record = Record::new(level, Arc::clone(&self.inner.name), message);
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            record = record.with_fields(fields);
        }
        if let Some(context) = self.resolve_context(explicit) {
            record = record.with_context(context);
        }
        record
    }

    /// thread context < bound context < explicit context
    fn resolve_context(&self, explicit: Option<&LogContext>) -> Option<Arc<LogContext>> {
        let mut merged: Option<Arc<LogContext>> = None;
        for layer in [current_context(), self.context.clone()].into_iter().flatten() {
            merged = Some(match merged {
                None => layer,
                Some(below) => Arc::new(below.merge(&layer)),
            });
        }
        match (merged, explicit) {
            (merged, None) => merged,
            (None, Some(explicit)) => Some(Arc::new(explicit.clone())),
            (Some(below), Some(explicit)) => Some(Arc::new(below.merge(explicit))),
        }
    }

    fn dispatch(&self, record: Record) {
        let inner = &*self.inner;
        match &inner.dispatch {
            Dispatch::Direct => {
                inner.pipeline.process(record);
            }
            Dispatch::Batched { batch_size } => {
                if let Some(line) = inner.pipeline.render(record) {
                    batching::append(inner.id, *batch_size, &inner.pipeline, line);
                }
            }
            Dispatch::Async { controller, config } => {
                let pipeline = Arc::clone(&inner.pipeline);
                let entry = if config.defer_formatting() {
                    QueueEntry::record(record, pipeline)
                } else {
                    match inner.pipeline.render(record) {
                        Some(line) => QueueEntry::formatted(line, pipeline),
                        None => return,
                    }
                };
                if let Err(SubmitError { error, entry }) = controller.submit(config, entry) {
                    // no backend to take it: write on this thread instead
                    diagnostics::report(&inner.name, &error);
                    entry.deliver_now();
                }
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("mode", &self.mode())
            .field("min_level", &self.inner.pipeline.min_level())
            .finish()
    }
}

enum PipelineSource {
    Default,
    Config(PipelineConfig),
    Shared(Arc<Pipeline>),
}

/// Builder for [`Logger`]
///
/// # Example
/// ```
/// use pipeline_logger::prelude::*;
///
/// let logger = Logger::builder("worker")
///     .min_level(LogLevel::Debug)
///     .batched(64)
///     .build()
///     .unwrap();
/// assert_eq!(logger.mode(), LoggerMode::Batched { batch_size: 64 });
/// ```
pub struct LoggerBuilder {
    name: String,
    min_level: Option<LogLevel>,
    pipeline: PipelineSource,
    batch_size: Option<usize>,
    async_config: Option<AsyncConfig>,
    controller: Option<Arc<BackendController>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: None,
            pipeline: PipelineSource::Default,
            batch_size: None,
            async_config: None,
            controller: None,
        }
    }

    /// Minimum level of the default pipeline
    ///
    /// Ignored when an explicit pipeline is supplied; the pipeline's own
    /// minimum level applies then.
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = PipelineSource::Shared(Arc::new(pipeline));
        self
    }

    /// Share a pipeline with other loggers
    #[must_use = "builder methods return a new value"]
    pub fn shared_pipeline(mut self, pipeline: Arc<Pipeline>) -> Self {
        self.pipeline = PipelineSource::Shared(pipeline);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline = PipelineSource::Config(config);
        self
    }

    /// Buffer lines per thread and write `batch_size` at a time
    #[must_use = "builder methods return a new value"]
    pub fn batched(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Deliver through an async backend started from `config`
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, config: AsyncConfig) -> Self {
        self.async_config = Some(config);
        self
    }

    /// Controller to use in async mode instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn backend(mut self, controller: Arc<BackendController>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn build(self) -> Result<Logger> {
        if self.name.is_empty() {
            return Err(LoggerError::config("Logger", "name must not be empty"));
        }

        let dispatch = match (self.batch_size, self.async_config) {
            (Some(_), Some(_)) => {
                return Err(LoggerError::config(
                    "Logger",
                    "batched and async modes are mutually exclusive",
                ));
            }
            (Some(0), None) => {
                return Err(LoggerError::config("Logger", "batch_size must be greater than 0"));
            }
            (Some(batch_size), None) => Dispatch::Batched { batch_size },
            (None, Some(config)) => {
                config.validate()?;
                Dispatch::Async {
                    controller: self.controller.unwrap_or_else(async_backend::global),
                    config,
                }
            }
            (None, None) => Dispatch::Direct,
        };

        let pipeline = match self.pipeline {
            PipelineSource::Shared(pipeline) => pipeline,
            PipelineSource::Config(config) => Arc::new(Pipeline::new(config)),
            PipelineSource::Default => Arc::new(crate::registry::console_pipeline(
                self.min_level.unwrap_or_default(),
            )),
        };

        Ok(Logger::assemble(Arc::from(self.name), pipeline, dispatch))
    }
}
