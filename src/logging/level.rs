//! Log levels
//!
//! Lower value means higher severity. A tag configured at some level accepts
//! every message whose level is less than or equal to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity/verbosity ranking of a message or a tag threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    /// Most severe; a tag at this level only lets errors through
    Error = 0,
    Warn = 1,
    Info = 2,
    /// Most verbose
    Debug = 3,
}

impl LogLevel {
    /// All levels, most severe first
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Whether a message at `self` passes a tag configured at `threshold`
    #[inline]
    pub fn passes(self, threshold: LogLevel) -> bool {
        self <= threshold
    }

    /// Uppercase label used in persisted lines
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a level name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown log level '{}' (expected error, warn, info or debug)",
            self.0
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "off" keeps only the most severe messages
            "error" | "off" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
