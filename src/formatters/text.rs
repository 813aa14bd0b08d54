//! Human-readable text formatter

use crate::core::{Formatter, Record, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use std::fmt::Write;

/// `[2025-01-08T10:30:45.123Z] [INFO    ] app (main) - Request processed user_id=42`
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
    use_colors: bool,
    show_thread: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            use_colors: false,
            show_thread: true,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Color the level tag; ignored without the `console` feature
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_thread(mut self, show_thread: bool) -> Self {
        self.show_thread = show_thread;
        self
    }

    fn level_tag(&self, record: &Record) -> String {
        let padded = format!("{:8}", record.level());
        #[cfg(feature = "console")]
        if self.use_colors {
            return padded.color(record.level().color_code()).to_string();
        }
        padded
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record) -> Result<String> {
        let mut line = String::with_capacity(96 + record.message().len());
        let _ = write!(
            line,
            "[{}] [{}] {}",
            self.timestamp_format.format(record.timestamp()),
            self.level_tag(record),
            record.logger_name()
        );
        if self.show_thread {
            let _ = write!(line, " ({})", record.thread_label());
        }
        let _ = write!(line, " - {}", record.message());

        if !record.fields().is_empty() {
            line.push(' ');
            line.push_str(&record.fields().format_pairs());
        }

        if let Some(context) = record.context() {
            if !context.is_empty() {
                line.push_str(" | ");
                line.push_str(&context.to_string());
            }
        }

        if let Some(exception) = record.exception() {
            let _ = write!(line, " | {}: {}", exception.kind, exception.message);
            if !exception.trace.is_empty() {
                let _ = write!(line, " ({})", exception.trace.replace('\n', "; "));
            }
        }

        if let Some(location) = record.source_location() {
            let _ = write!(line, " @ {}:{}", location.file, location.line);
        }

        Ok(line)
    }

    fn name(&self) -> &str {
        "text"
    }
}
