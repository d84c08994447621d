//! Configuration management
//!
//! Config file is stored in the platform config directory as
//! `taglog/config.toml`. Every field is optional.

use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LEVEL};
use crate::error::{LogError, Result};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LogConfig,
    /// Per-tag level overrides
    pub tags: BTreeMap<String, LogLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for tags without an override
    pub default_level: LogLevel,
    /// Where `current.log` / `previous.log` live (empty = platform cache dir)
    pub directory: Option<PathBuf>,
    /// Internal builds record error messages and make `require_internal` fatal
    pub internal_build: bool,
    /// Start recording as soon as the facility is built
    pub record_on_start: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL,
            directory: None,
            internal_build: false,
            record_on_start: false,
        }
    }
}

impl LogConfig {
    /// Configured directory, else `<cache dir>/taglog`, else the temp dir
    pub fn log_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        match cache_dir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!("{}, logging to the temp directory", e);
                std::env::temp_dir().join(APP_DIR_NAME)
            }
        }
    }
}

/// `<platform cache dir>/taglog`
pub fn cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .ok_or(LogError::NoPlatformDirectory { kind: "cache" })
}

/// `<platform config dir>/taglog/config.toml`
pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(LogError::NoPlatformDirectory { kind: "config" })
}

/// Parse the config at `path`
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| LogError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| LogError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load config from the default location, falling back to defaults
pub fn load() -> Config {
    let path = match config_path() {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to determine config path: {}, using defaults", e);
            return Config::default();
        }
    };

    if !path.exists() {
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Write config to `path`, creating parent directories
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LogError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| LogError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|e| LogError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default values tests
    // =========================================================================

    #[test]
    fn test_default_log_config_values() {
        let config = LogConfig::default();

        assert_eq!(config.default_level, LogLevel::Warn);
        assert_eq!(config.directory, None);
        assert!(!config.internal_build);
        assert!(!config.record_on_start);
    }

    #[test]
    fn test_config_empty_file() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.logging.default_level, LogLevel::Warn);
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_explicit_directory_wins() {
        let config = LogConfig {
            directory: Some(PathBuf::from("/var/tmp/app-logs")),
            ..Default::default()
        };
        assert_eq!(config.log_directory(), PathBuf::from("/var/tmp/app-logs"));
    }

    // =========================================================================
    // Parsing tests
    // =========================================================================

    #[test]
    fn test_config_partial_logging_section() {
        let partial_toml = r#"
[logging]
default_level = "info"

[tags]
Network = "debug"
UI = "error"
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        assert_eq!(config.logging.default_level, LogLevel::Info);
        assert!(!config.logging.internal_build);
        assert_eq!(config.tags.get("Network"), Some(&LogLevel::Debug));
        assert_eq!(config.tags.get("UI"), Some(&LogLevel::Error));
    }

    #[test]
    fn test_config_rejects_unknown_level() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[logging]\ndefault_level = \"loud\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // File tests
    // =========================================================================

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.logging.internal_build = true;
        config.logging.directory = Some(dir.path().join("logs"));
        config.tags.insert("Sync".into(), LogLevel::Info);

        save_to(&config, &path).unwrap();
        let restored = load_from(&path).unwrap();

        assert!(restored.logging.internal_build);
        assert_eq!(restored.logging.directory, Some(dir.path().join("logs")));
        assert_eq!(restored.tags.get("Sync"), Some(&LogLevel::Info));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, LogError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "logging = 3").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, LogError::ConfigParse { .. }));
    }
}
