//! Error types for the logging pipeline
//!
//! Configuration errors are returned to the caller at construction time.
//! Everything else is produced inside the pipeline or the async workers and is
//! reported through [`crate::core::diagnostics`] instead of reaching the caller.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Invalid log level name or value
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Writer failure
    #[error("Writer '{writer}' failed: {message}")]
    WriterError { writer: String, message: String },

    /// Formatter failure
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Enricher failure
    #[error("Enricher '{enricher}' failed: {message}")]
    EnricherError { enricher: String, message: String },

    /// Filter failure
    #[error("Filter '{filter}' failed: {message}")]
    FilterError { filter: String, message: String },

    /// A user-supplied stage panicked
    #[error("{stage} panicked: {message}")]
    StagePanicked { stage: String, message: String },

    /// Backend was shut down while an entry was being submitted
    #[error("Async backend is stopped")]
    BackendStopped,

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker thread {index}: {source}")]
    WorkerSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error
    pub fn writer(writer: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WriterError {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create an enricher error
    pub fn enricher(enricher: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::EnricherError {
            enricher: enricher.into(),
            message: message.into(),
        }
    }

    /// Create a filter error
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FilterError {
            filter: filter.into(),
            message: message.into(),
        }
    }

    /// Create an error describing a caught panic
    pub fn panicked(stage: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::StagePanicked {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors that must surface to the caller instead of the fallback channel
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. } | LoggerError::InvalidLevel(_)
        )
    }
}
