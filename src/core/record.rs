//! Immutable log record

use super::field::{FieldValue, Fields};
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::timestamp;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::sync::Arc;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<Arc<str>>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<Arc<str>>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> Arc<str> {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| Arc::from(format!("{:?}", std::thread::current().id())))
            .clone()
    })
}

fn current_thread_name() -> Option<Arc<str>> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(Arc::from))
            .clone()
    })
}

/// Replaces newlines, carriage returns, and tabs with escape sequences so a
/// record always renders as a single line.
pub(crate) fn sanitize_message(message: &str) -> String {
    if !message.contains(['\n', '\r', '\t']) {
        return message.to_string();
    }
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Like [`sanitize_message`], but keeps the shared name when nothing changes
fn sanitize_name(name: Arc<str>) -> Arc<str> {
    if name.contains(['\n', '\r', '\t']) {
        Arc::from(sanitize_message(&name))
    } else {
        name
    }
}

/// Where in the source a record was emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub module: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(module: &'static str, file: &'static str, line: u32) -> Self {
        Self { module, file, line }
    }
}

/// A captured error: its type, display text, and source chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
    pub trace: String,
}

impl ExceptionInfo {
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            kind: std::any::type_name::<E>().to_string(),
            message: sanitize_message(&error.to_string()),
            trace: trace.join("\n"),
        }
    }
}

/// One log event
///
/// A `Record` is never mutated after construction. The `with_*` methods take
/// the record by value and return a new one; fields and context live behind
/// `Arc` so derived records share unchanged parts with their source.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    logger_name: Arc<str>,
    message: Arc<str>,
    fields: Arc<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Arc<LogContext>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<Arc<ExceptionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_location: Option<SourceLocation>,
    thread_id: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_name: Option<Arc<str>>,
    process_id: u32,
}

impl Record {
    /// Create a record stamped with the current time and calling thread
    pub fn new(level: LogLevel, logger_name: impl Into<Arc<str>>, message: impl AsRef<str>) -> Self {
        Self {
            timestamp: timestamp::now(),
            level,
            logger_name: sanitize_name(logger_name.into()),
            message: Arc::from(sanitize_message(message.as_ref())),
            fields: Arc::new(Fields::new()),
            context: None,
            exception: None,
            source_location: None,
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
            process_id: std::process::id(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Arc::new(fields);
        self
    }

    /// Add or replace one field; other records sharing the map are unaffected
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Arc::make_mut(&mut self.fields).insert(key, value);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Arc<LogContext>) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(Arc::new(exception));
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.source_location = Some(location);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl AsRef<str>) -> Self {
        self.message = Arc::from(sanitize_message(message.as_ref()));
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn context(&self) -> Option<&LogContext> {
        self.context.as_deref()
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_deref()
    }

    pub fn source_location(&self) -> Option<&SourceLocation> {
        self.source_location.as_ref()
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    /// Thread name when set, otherwise the thread id
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }

    /// True when both records point at the same field map allocation
    pub fn shares_fields_with(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }
}
