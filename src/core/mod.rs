//! Core types: records, the pipeline, stage traits and the logger

mod batching;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod pipeline;
pub mod record;
pub mod stages;
pub mod timestamp;
pub mod writer;

pub use error::{LoggerError, Result};
pub use field::{FieldValue, Fields};
pub use log_context::{
    clear_request_context, context_scope, current_context, set_custom_context,
    set_request_context, set_user_context, ContextGuard, LogContext,
};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerMode};
pub use metrics::{BackendMetrics, MetricsSnapshot, PipelineMetrics};
pub use overflow_policy::{OverflowCallback, OverflowStrategy};
pub use pipeline::{fallback_format, Pipeline, PipelineBuilder, PipelineConfig};
pub use record::{ExceptionInfo, Record, SourceLocation};
pub use stages::{Enricher, Filter, Formatter};
pub use timestamp::TimestampFormat;
pub use writer::Writer;
