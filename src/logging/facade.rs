//! Per-tag logging handle
//!
//! Message closures run on the calling thread, right away, so they capture
//! the values as they are at the call site. Filtering and delivery happen
//! later on the worker.

use super::{LogLevel, Logging};
use crate::privacy::SanitizedString;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Logging handle bound to one tag
///
/// Cheap to clone. Creating one registers the tag at the default level.
#[derive(Clone)]
pub struct TagLogger {
    tag: Arc<str>,
    logging: Logging,
}

impl TagLogger {
    pub(crate) fn new(logging: Logging, tag: &str) -> Self {
        let tag: Arc<str> = Arc::from(tag);
        let registered = Arc::clone(&tag);
        logging
            .worker()
            .submit(move |state| state.tags.register(&registered));
        Self { tag, logging }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    // === Leveled entry points ===

    #[track_caller]
    pub fn error(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl FnOnce() -> String) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl FnOnce() -> String) {
        self.logging.submit_record(
            level,
            Some(Arc::clone(&self.tag)),
            message(),
            Location::caller(),
        );
    }

    /// Log text built with `sanitized!`
    #[track_caller]
    pub fn safe(&self, level: LogLevel, message: SanitizedString) {
        self.logging.submit_record(
            level,
            Some(Arc::clone(&self.tag)),
            message.into_string(),
            Location::caller(),
        );
    }

    // === Guards ===
    //
    // These read the level on the calling thread and may miss a change that
    // is still queued on the worker.

    pub fn if_warn<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.run_if(LogLevel::Warn, f)
    }

    pub fn if_info<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.run_if(LogLevel::Info, f)
    }

    pub fn if_debug<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.run_if(LogLevel::Debug, f)
    }

    /// Best-effort check of the current threshold
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.logging.levels().should_log(level, Some(&*self.tag))
    }

    fn run_if<R>(&self, level: LogLevel, f: impl FnOnce() -> R) -> Option<R> {
        self.is_enabled(level).then(f)
    }

    // === Level ===

    pub fn set_level(&self, level: LogLevel) {
        self.logging.set_level(&self.tag, level);
    }

    pub fn level(&self) -> LogLevel {
        self.logging.level(&self.tag)
    }
}

impl fmt::Debug for TagLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagLogger").field("tag", &self.tag).finish()
    }
}
