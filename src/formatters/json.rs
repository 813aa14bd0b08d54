//! JSON formatter for structured output
//!
//! Writes each record as a single-line JSON object (JSONL). Structured fields
//! are nested under `"fields"` so they can never collide with the envelope
//! keys, which keeps the mapping decodable back into [`Fields`].

use crate::core::{Fields, Formatter, Record, Result, TimestampFormat};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    pretty: bool,
}

/// The parts of a JSON line that survive a decode
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedLine {
    pub level: String,
    pub logger: String,
    pub message: String,
    #[serde(default)]
    pub fields: Fields,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multi-line output; breaks the one-record-per-line property of batches
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn to_value(&self, record: &Record) -> Value {
        let mut obj = Map::new();

        obj.insert(
            "timestamp".to_string(),
            self.timestamp_format.to_json_value(record.timestamp()),
        );
        obj.insert("level".to_string(), Value::String(record.level().to_str().to_string()));
        obj.insert("logger".to_string(), Value::String(record.logger_name().to_string()));
        obj.insert("message".to_string(), Value::String(record.message().to_string()));

        if !record.fields().is_empty() {
            obj.insert("fields".to_string(), record.fields().to_json_value());
        }

        if let Some(context) = record.context() {
            if !context.is_empty() {
                obj.insert("context".to_string(), context.to_fields().to_json_value());
            }
        }

        if let Some(exception) = record.exception() {
            let mut exc = Map::new();
            exc.insert("type".to_string(), Value::String(exception.kind.clone()));
            exc.insert("message".to_string(), Value::String(exception.message.clone()));
            exc.insert("trace".to_string(), Value::String(exception.trace.clone()));
            obj.insert("exception".to_string(), Value::Object(exc));
        }

        if let Some(location) = record.source_location() {
            obj.insert("module".to_string(), Value::String(location.module.to_string()));
            obj.insert("file".to_string(), Value::String(location.file.to_string()));
            obj.insert("line".to_string(), Value::Number(location.line.into()));
        }

        obj.insert("thread_id".to_string(), Value::String(record.thread_id().to_string()));
        if let Some(name) = record.thread_name() {
            obj.insert("thread_name".to_string(), Value::String(name.to_string()));
        }
        obj.insert("process_id".to_string(), Value::Number(record.process_id().into()));

        Value::Object(obj)
    }

    /// Parse a line produced by this formatter
    pub fn decode(line: &str) -> Result<DecodedLine> {
        Ok(serde_json::from_str(line)?)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Result<String> {
        let value = self.to_value(record);
        let line = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(line)
    }

    fn name(&self) -> &str {
        "json"
    }
}
