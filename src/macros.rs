//! Logging macros with `format!`-style messages and call-site capture.
//!
//! The level check happens before the message is formatted, so a disabled
//! level costs one integer comparison.
//!
//! # Examples
//!
//! ```
//! use pipeline_logger::prelude::*;
//! use pipeline_logger::{info, warning};
//!
//! let logger = Logger::builder("server").build().unwrap();
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//!
//! // Structured fields go in braces before the message
//! warning!(logger, { "port" => port, "retry" => true }, "bind retried");
//! ```

/// Build a [`Fields`](crate::core::Fields) map from `key => value` pairs.
///
/// ```
/// use pipeline_logger::fields;
///
/// let fields = fields! { "user_id" => 42, "action" => "login" };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut fields = $crate::core::Fields::new();
        $( fields.insert($key, $value); )*
        fields
    }};
}

/// Log at an explicit level.
///
/// ```
/// # use pipeline_logger::prelude::*;
/// use pipeline_logger::log;
/// # let logger = Logger::builder("docs").build().unwrap();
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, { "code" => 500 }, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_at(
                level,
                format!($($arg)+),
                Some($crate::fields! { $($key => $value),* }),
                $crate::core::SourceLocation::new(module_path!(), file!(), line!()),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_at(
                level,
                format!($($arg)+),
                None,
                $crate::core::SourceLocation::new(module_path!(), file!(), line!()),
            );
        }
    }};
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use pipeline_logger::prelude::*;
/// use pipeline_logger::error;
/// # let logger = Logger::builder("docs").build().unwrap();
/// let path = "/etc/app.toml";
/// error!(logger, { "path" => path }, "failed to read {}", path);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Critical, $($arg)+)
    };
}
