//! System log boundary
//!
//! The facility hands every accepted, formatted line to a `SystemLog`. The
//! default forwards to `tracing`, so whatever subscriber the host installed
//! decides where it ends up.

use super::LogLevel;
use crate::constants::TRACING_TARGET;
use tracing::{debug, error, info, warn};

/// Receiver of formatted lines for the platform log
pub trait SystemLog: Send + 'static {
    fn send_message(&self, text: &str, level: LogLevel);
}

/// Forwards lines as `tracing` events under the `taglog` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSystemLog;

impl SystemLog for TracingSystemLog {
    fn send_message(&self, text: &str, level: LogLevel) {
        match level {
            LogLevel::Error => error!(target: TRACING_TARGET, "{}", text),
            LogLevel::Warn => warn!(target: TRACING_TARGET, "{}", text),
            LogLevel::Info => info!(target: TRACING_TARGET, "{}", text),
            LogLevel::Debug => debug!(target: TRACING_TARGET, "{}", text),
        }
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSystemLog;

impl SystemLog for NullSystemLog {
    fn send_message(&self, _text: &str, _level: LogLevel) {}
}
