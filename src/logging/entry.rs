//! Log record types
//!
//! A `LogRecord` only exists while an accepted message is being delivered to
//! the system log and hooks. It is never persisted as a struct.

use super::LogLevel;
use chrono::{DateTime, Local, Timelike};
use std::panic::Location;
use std::sync::Arc;

/// An accepted message, as seen by hooks
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    /// `None` for untagged messages
    pub tag: Option<Arc<str>>,
    pub text: String,
    pub timestamp: DateTime<Local>,
    pub file: &'static str,
    pub line: u32,
}

impl LogRecord {
    pub fn new(
        level: LogLevel,
        tag: Option<Arc<str>>,
        text: String,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            level,
            tag,
            text,
            timestamp: Local::now(),
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Line handed to the system log: `<file>:<line> <tag> <message>`
    pub fn system_line(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{} {} {}", self.file, self.line, tag, self.text),
            None => format!("{}:{} {}", self.file, self.line, self.text),
        }
    }

    /// Line written to the current log while recording:
    /// `<timestamp>: [<level>] [<tag>] <text>\n`
    pub fn recorded_line(&self) -> String {
        format!(
            "{}: [{}] [{}] {}\n",
            format_timestamp(&self.timestamp),
            self.level,
            self.tag().unwrap_or(""),
            self.text
        )
    }
}

/// `YYYY-MM-DD HH:mm:ss.ssss ±HHMM`
///
/// chrono only offers 3/6/9 fractional digits, so the four-digit fraction is
/// built by hand.
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    let tenths_of_ms = (ts.nanosecond() % 1_000_000_000) / 100_000;
    format!(
        "{}.{:04} {}",
        ts.format("%Y-%m-%d %H:%M:%S"),
        tenths_of_ms,
        ts.format("%z")
    )
}
