//! Centralized error types
//!
//! Only configuration loading and the command-line surface report errors.
//! The logging facility itself degrades silently.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogError>`.

use std::fmt;
use std::path::PathBuf;

/// All crate errors
#[derive(Debug)]
pub enum LogError {
    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Config ===
    /// Config file exists but could not be read
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for the expected schema
    ConfigParse { path: PathBuf, reason: String },
    /// Platform exposes no config/cache directory
    NoPlatformDirectory { kind: &'static str },
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::ConfigRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "IO error: {}", path.display()),
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config file: {}", path.display())
            }
            Self::ConfigParse { path, reason } => {
                write!(f, "Invalid config {}: {}", path.display(), reason)
            }
            Self::NoPlatformDirectory { kind } => {
                write!(f, "No {} directory on this platform", kind)
            }
        }
    }
}

/// Alias for Result with LogError
pub type Result<T> = std::result::Result<T, LogError>;
