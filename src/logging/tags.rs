//! Tag registry and level filtering
//!
//! The registry is owned by the log worker, which is the only writer. Callers
//! get a `LevelView` that reads the same map from their own thread for the
//! best-effort `if_*` guards.

use super::LogLevel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type LevelMap = Arc<RwLock<HashMap<String, LogLevel>>>;

/// Mapping from tag name to minimum accepted level
pub struct TagRegistry {
    levels: LevelMap,
    default_level: LogLevel,
}

impl TagRegistry {
    pub fn new(default_level: LogLevel) -> Self {
        Self {
            levels: Arc::new(RwLock::new(HashMap::new())),
            default_level,
        }
    }

    /// Insert `tag` at the default level if unseen; no-op otherwise
    pub fn register(&mut self, tag: &str) {
        if self.levels.read().contains_key(tag) {
            return;
        }
        self.levels
            .write()
            .entry(tag.to_string())
            .or_insert(self.default_level);
    }

    pub fn set_level(&mut self, tag: &str, level: LogLevel) {
        self.levels.write().insert(tag.to_string(), level);
    }

    /// Configured level, or the default for tags never registered
    pub fn level(&self, tag: &str) -> LogLevel {
        self.levels
            .read()
            .get(tag)
            .copied()
            .unwrap_or(self.default_level)
    }

    /// Untagged messages always pass
    pub fn should_log(&self, level: LogLevel, tag: Option<&str>) -> bool {
        match tag {
            None => true,
            Some(tag) => level.passes(self.level(tag)),
        }
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.levels.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Read-only handle on the same map
    pub fn view(&self) -> LevelView {
        LevelView {
            levels: Arc::clone(&self.levels),
            default_level: self.default_level,
        }
    }
}

/// Read-only, possibly stale, view of a `TagRegistry`
///
/// Pending level changes still queued on the worker are not visible yet.
#[derive(Clone)]
pub struct LevelView {
    levels: LevelMap,
    default_level: LogLevel,
}

impl LevelView {
    pub fn level(&self, tag: &str) -> LogLevel {
        self.levels
            .read()
            .get(tag)
            .copied()
            .unwrap_or(self.default_level)
    }

    pub fn should_log(&self, level: LogLevel, tag: Option<&str>) -> bool {
        match tag {
            None => true,
            Some(tag) => level.passes(self.level(tag)),
        }
    }
}
