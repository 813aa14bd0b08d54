//! Logfmt formatter (key=value pairs)

use crate::core::{FieldValue, Formatter, Record, Result, TimestampFormat};

/// `timestamp=2025-01-08T10:30:45.123Z level=INFO logger=app message="Request processed"`
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Strip everything but alphanumerics, `_`, `-` and `.` from a key
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect()
    }

    /// Quote a value only if it contains spaces, quotes or `=`
    fn escape_value(value: &str) -> String {
        if value.is_empty() || value.contains([' ', '"', '=']) {
            Self::quote(value)
        } else {
            value.to_string()
        }
    }

    fn quote(value: &str) -> String {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        format!("\"{}\"", escaped)
    }

    fn render_value(value: &FieldValue) -> String {
        match value {
            FieldValue::String(s) => Self::quote(s),
            FieldValue::Array(_) | FieldValue::Map(_) => Self::quote(&value.to_string()),
            other => other.to_string(),
        }
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, record: &Record) -> Result<String> {
        let mut parts = vec![
            format!(
                "timestamp={}",
                Self::escape_value(&self.timestamp_format.format(record.timestamp()))
            ),
            format!("level={}", record.level().to_str()),
            format!("logger={}", Self::escape_value(record.logger_name())),
            format!("message={}", Self::quote(record.message())),
        ];

        for (key, value) in record.fields().iter() {
            parts.push(format!("{}={}", Self::escape_key(key), Self::render_value(value)));
        }

        if let Some(context) = record.context() {
            for (key, value) in context.to_fields().iter() {
                parts.push(format!(
                    "ctx.{}={}",
                    Self::escape_key(key),
                    Self::render_value(value)
                ));
            }
        }

        if let Some(exception) = record.exception() {
            parts.push(format!("exception={}", Self::quote(&exception.message)));
        }

        parts.push(format!("thread={}", Self::escape_value(record.thread_label())));

        Ok(parts.join(" "))
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, LogLevel};

    #[test]
    fn test_logfmt_format() {
        let record = Record::new(LogLevel::Warning, "app", "Warning message");
        let line = LogfmtFormatter::new().format(&record).unwrap();

        assert!(line.contains("level=WARNING"));
        assert!(line.contains("logger=app"));
        assert!(line.contains("message=\"Warning message\""));
    }

    #[test]
    fn test_logfmt_fields() {
        let record = Record::new(LogLevel::Debug, "app", "Query executed").with_fields(
            Fields::new()
                .with("query", "SELECT * FROM users WHERE id=1")
                .with("count", 5)
                .with("bad key!", true),
        );
        let line = LogfmtFormatter::new().format(&record).unwrap();

        assert!(line.contains("query=\"SELECT * FROM users WHERE id=1\""));
        assert!(line.contains("count=5"));
        assert!(line.contains("badkey=true"));
    }
}
