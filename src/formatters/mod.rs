//! Built-in formatters
//!
//! - Text: human-readable single line (default)
//! - Json: one JSON object per record, fields nested under `"fields"`
//! - Logfmt: key=value pairs compatible with log aggregation tools

pub mod json;
pub mod logfmt;
pub mod text;

pub use json::JsonFormatter;
pub use logfmt::LogfmtFormatter;
pub use text::TextFormatter;
