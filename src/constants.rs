//! Crate-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

use crate::logging::LogLevel;

// =============================================================================
// Files
// =============================================================================

/// File name of the actively appended log generation
pub const CURRENT_LOG_NAME: &str = "current.log";

/// File name of the log generation produced by the last rotation
pub const PREVIOUS_LOG_NAME: &str = "previous.log";

/// Directory name used under the platform cache/config directories
pub const APP_DIR_NAME: &str = "taglog";

/// Config file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Levels
// =============================================================================

/// Level assigned to a tag until it is explicitly configured
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Warn;

// =============================================================================
// Worker
// =============================================================================

/// Name of the thread that serializes all log-state mutation
pub const WORKER_THREAD_NAME: &str = "taglog-worker";

/// `tracing` target used when forwarding accepted messages
pub const TRACING_TARGET: &str = "taglog";
