//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record. Discriminants are the conventional numeric values so
/// the level gate is a single integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 10,
    #[default]
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a level name, accepting `WARN` as an alias of `WARNING`
    pub fn from_name(name: &str) -> Result<Self, LoggerError> {
        name.parse()
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Critical => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: u8) -> Result<Self, LoggerError> {
        match value {
            10 => Ok(LogLevel::Debug),
            20 => Ok(LogLevel::Info),
            30 => Ok(LogLevel::Warning),
            40 => Ok(LogLevel::Error),
            50 => Ok(LogLevel::Critical),
            other => Err(LoggerError::InvalidLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(LogLevel::try_from(10).unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::try_from(30).unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::try_from(50).unwrap(), LogLevel::Critical);
        assert_eq!(LogLevel::try_from(40).unwrap(), LogLevel::Error);
        assert!(matches!(LogLevel::try_from(99), Err(LoggerError::InvalidLevel(v)) if v == "99"));
        assert_eq!(LogLevel::Error.as_u8(), 40);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(LogLevel::from_name("warning").unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("WARN").unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("critical").unwrap(), LogLevel::Critical);
        assert!(matches!(
            LogLevel::from_name("INVALID"),
            Err(LoggerError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_display_padding() {
        assert_eq!(format!("{:7}", LogLevel::Info), "INFO   ");
        assert_eq!(LogLevel::Critical.to_string(), "CRITICAL");
    }
}
