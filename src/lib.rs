//! # Pipeline Logger
//!
//! Structured logging built around an immutable [`Record`](core::Record) and a
//! fixed **enrich → filter → format → write** [`Pipeline`](core::Pipeline).
//!
//! ## Features
//!
//! - **Cheap gating**: a disabled level costs one integer comparison
//! - **Three delivery modes**: direct, thread-local batching, and async
//!   workers behind a bounded queue with `block` / `drop_oldest` /
//!   `drop_newest` overflow strategies
//! - **Failure isolation**: a failing enricher, filter, formatter or writer
//!   is reported on stderr and never reaches the caller
//! - **Structured output**: typed fields, thread-scoped context, text, JSON
//!   and logfmt formatters
//!
//! ## Quick start
//!
//! ```
//! use pipeline_logger::prelude::*;
//! use pipeline_logger::info;
//!
//! let logger = Logger::builder("app")
//!     .pipeline(
//!         Pipeline::builder()
//!             .min_level(LogLevel::Info)
//!             .enricher(StaticFieldsEnricher::default().with("service", "billing"))
//!             .formatter(JsonFormatter::new())
//!             .writer(ConsoleWriter::new())
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! info!(logger, { "order_id" => 1234 }, "order accepted");
//! ```
//!
//! Async loggers share a [`BackendController`](async_backend::BackendController);
//! call [`shutdown_async_logging`](async_backend::shutdown_async_logging) (or
//! `shutdown` on a private controller) before exit to drain the queue.

pub mod async_backend;
pub mod core;
pub mod enrichers;
pub mod filters;
pub mod formatters;
pub mod macros;
pub mod registry;
pub mod writers;

pub mod prelude {
    pub use crate::async_backend::{
        shutdown_async_logging, AsyncConfig, BackendController, BackendStats,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::core::{
        context_scope, Enricher, FieldValue, Fields, Filter, Formatter, LogContext, LogLevel,
        Logger, LoggerBuilder, LoggerError, LoggerMode, OverflowStrategy, Pipeline,
        PipelineConfig, Record, Result, TimestampFormat, Writer,
    };
    pub use crate::enrichers::{ContextFieldsEnricher, StaticFieldsEnricher};
    pub use crate::filters::{LevelRangeFilter, LoggerNameFilter, SamplingFilter};
    pub use crate::formatters::{JsonFormatter, LogfmtFormatter, TextFormatter};
    pub use crate::registry::{get_async_logger, get_logger, set_default_level};
    pub use crate::writers::{ConsoleWriter, FileWriter, MemoryWriter, NullWriter};
}

pub use crate::core::{LogLevel, Logger, LoggerError, Pipeline, Record, Result};
pub use registry::{console_pipeline, file_pipeline, get_async_logger, get_logger};
