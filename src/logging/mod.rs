//! Tagged logging facility
//!
//! Centralizes all log-related types:
//! - `Logging` - the facility handle (levels, hooks, recording, log files)
//! - `TagLogger` - per-tag leveled entry points
//! - `LogSink` - two-generation persistence (`current.log` / `previous.log`)
//! - `SystemLog` - where accepted lines go besides hooks
//!
//! All state lives on a single worker thread; see `worker`.

mod entry;
mod facade;
pub mod file;
mod hooks;
mod level;
mod recording;
mod system;
mod tags;
mod worker;

pub use entry::{format_timestamp, LogRecord};
pub use facade::TagLogger;
pub use file::LogSink;
pub use hooks::{Hook, HookRegistry, HookToken};
pub use level::{LogLevel, ParseLevelError};
pub use recording::should_record;
pub use system::{NullSystemLog, SystemLog, TracingSystemLog};
pub use tags::{LevelView, TagRegistry};

use crate::config::{self, Config};
use crate::constants::DEFAULT_LEVEL;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use worker::{LogState, Worker};

/// Initialize `tracing` output for the crate's own diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}

// =============================================================================
// Options
// =============================================================================

/// Construction parameters for a `Logging` facility
pub struct LoggingOptions {
    directory: PathBuf,
    default_level: LogLevel,
    tag_levels: HashMap<String, LogLevel>,
    system_log: Box<dyn SystemLog>,
}

impl LoggingOptions {
    /// Options persisting to `directory`, with tracing as system log
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            default_level: DEFAULT_LEVEL,
            tag_levels: HashMap::new(),
            system_log: Box::new(TracingSystemLog),
        }
    }

    pub fn default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn tag_level(mut self, tag: impl Into<String>, level: LogLevel) -> Self {
        self.tag_levels.insert(tag.into(), level);
        self
    }

    pub fn system_log(mut self, system_log: impl SystemLog) -> Self {
        self.system_log = Box::new(system_log);
        self
    }
}

impl fmt::Debug for LoggingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingOptions")
            .field("directory", &self.directory)
            .field("default_level", &self.default_level)
            .field("tag_levels", &self.tag_levels)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Facility
// =============================================================================

struct Inner {
    worker: Worker,
    levels: LevelView,
    directory: PathBuf,
    default_level: LogLevel,
}

/// Handle on a logging facility
///
/// Clones share the same worker. The worker stops once the last handle is
/// dropped, after running everything already submitted.
#[derive(Clone)]
pub struct Logging {
    inner: Arc<Inner>,
}

static GLOBAL: OnceLock<Logging> = OnceLock::new();

impl Logging {
    pub fn new(options: LoggingOptions) -> Self {
        let mut tags = TagRegistry::new(options.default_level);
        for (tag, level) in &options.tag_levels {
            tags.set_level(tag, *level);
        }
        let levels = tags.view();

        let state = LogState {
            tags,
            hooks: HookRegistry::new(),
            sink: Arc::new(Mutex::new(LogSink::new(options.directory.clone()))),
            recording: None,
            system_log: options.system_log,
        };

        Self {
            inner: Arc::new(Inner {
                worker: Worker::spawn(state),
                levels,
                directory: options.directory,
                default_level: options.default_level,
            }),
        }
    }

    /// Facility configured from a loaded `Config`
    pub fn from_config(cfg: &Config) -> Self {
        let mut options = LoggingOptions::new(cfg.logging.log_directory())
            .default_level(cfg.logging.default_level);
        for (tag, level) in &cfg.tags {
            options = options.tag_level(tag.clone(), *level);
        }

        let logging = Self::new(options);
        if cfg.logging.record_on_start {
            logging.start_recording(cfg.logging.internal_build);
        }
        logging
    }

    /// Process-wide facility, built from `config::load()` on first use
    pub fn global() -> &'static Logging {
        GLOBAL.get_or_init(|| Logging::from_config(&config::load()))
    }

    /// Handle for `tag`, registering it if unseen
    pub fn tagged(&self, tag: &str) -> TagLogger {
        TagLogger::new(self.clone(), tag)
    }

    /// Generic entry point; `tag: None` is never filtered
    #[track_caller]
    pub fn log(&self, level: LogLevel, tag: Option<&str>, message: impl FnOnce() -> String) {
        self.submit_record(level, tag.map(Arc::from), message(), Location::caller());
    }

    pub(crate) fn submit_record(
        &self,
        level: LogLevel,
        tag: Option<Arc<str>>,
        text: String,
        location: &'static Location<'static>,
    ) {
        let record = LogRecord::new(level, tag, text, location);
        self.worker().submit(move |state| state.emit(record));
    }

    // === Levels ===

    pub fn set_level(&self, tag: &str, level: LogLevel) {
        let tag = tag.to_string();
        self.worker()
            .submit(move |state| state.tags.set_level(&tag, level));
    }

    /// Level of `tag` once every queued change has applied
    pub fn level(&self, tag: &str) -> LogLevel {
        let owned = tag.to_string();
        self.worker()
            .query(move |state| state.tags.level(&owned))
            .unwrap_or_else(|| self.inner.levels.level(tag))
    }

    /// Registered tags, sorted
    pub fn all_tags(&self) -> Vec<String> {
        self.worker()
            .query(|state| state.tags.tags())
            .unwrap_or_default()
    }

    pub fn default_level(&self) -> LogLevel {
        self.inner.default_level
    }

    pub(crate) fn levels(&self) -> &LevelView {
        &self.inner.levels
    }

    // === Hooks ===

    pub fn add_hook(&self, hook: impl FnMut(&LogRecord) + Send + 'static) -> HookToken {
        let token = HookToken::next();
        let hook: Hook = Box::new(hook);
        self.worker()
            .submit(move |state| state.hooks.insert(token, hook));
        token
    }

    pub fn remove_hook(&self, token: HookToken) {
        self.worker().submit(move |state| state.hooks.remove(token));
    }

    /// Also removes the recording hook, which ends recording without
    /// touching the log files
    pub fn remove_all_hooks(&self) {
        self.worker().submit(|state| {
            state.hooks.clear();
            state.recording = None;
        });
    }

    // === Recording ===

    pub fn start_recording(&self, internal_build: bool) {
        self.worker()
            .submit(move |state| recording::start(state, internal_build));
    }

    pub fn stop_recording(&self) {
        self.worker().submit(recording::stop);
    }

    pub fn is_recording(&self) -> bool {
        self.worker()
            .query(|state| state.recording.is_some())
            .unwrap_or(false)
    }

    // === Log files ===

    pub fn log_directory(&self) -> &Path {
        &self.inner.directory
    }

    pub fn clear_logs(&self) {
        self.worker().submit(|state| state.sink.lock().clear());
    }

    pub fn switch_current_to_previous(&self) {
        self.worker().submit(|state| state.sink.lock().rotate());
    }

    /// Append raw text to the current log, bypassing filters and hooks
    pub fn append_to_current_log(&self, text: impl Into<String>) {
        let text = text.into();
        self.worker()
            .submit(move |state| state.sink.lock().append(&text));
    }

    pub fn current_log(&self) -> Option<Vec<u8>> {
        self.worker()
            .query(|state| state.sink.lock().read_current())
            .flatten()
    }

    pub fn previous_log(&self) -> Option<Vec<u8>> {
        self.worker()
            .query(|state| state.sink.lock().read_previous())
            .flatten()
    }

    pub fn paths_for_existing_logs(&self) -> Vec<PathBuf> {
        self.worker()
            .query(|state| state.sink.lock().existing_paths())
            .unwrap_or_default()
    }

    // === Barrier ===

    /// Block until everything submitted so far has been processed
    ///
    /// Returns immediately when called from a hook.
    pub fn sync(&self) {
        self.worker().sync();
    }

    fn worker(&self) -> &Worker {
        &self.inner.worker
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("directory", &self.inner.directory)
            .field("default_level", &self.inner.default_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn logging(dir: &Path) -> Logging {
        Logging::new(LoggingOptions::new(dir).system_log(NullSystemLog))
    }

    fn text(bytes: Option<Vec<u8>>) -> String {
        String::from_utf8(bytes.unwrap_or_default()).unwrap()
    }

    // === Levels ===

    #[test]
    fn test_unconfigured_tag_reports_default() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        assert_eq!(logging.level("nobody"), LogLevel::Warn);
    }

    #[test]
    fn test_option_tag_levels_are_preset() {
        let dir = tempfile::tempdir().unwrap();
        let logging = Logging::new(
            LoggingOptions::new(dir.path())
                .system_log(NullSystemLog)
                .default_level(LogLevel::Error)
                .tag_level("Net", LogLevel::Debug),
        );

        assert_eq!(logging.level("Net"), LogLevel::Debug);
        assert_eq!(logging.level("Other"), LogLevel::Error);
        assert_eq!(logging.default_level(), LogLevel::Error);
    }

    #[test]
    fn test_log_registers_tag() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        logging.log(LogLevel::Debug, Some("Lazy"), || "filtered".into());
        assert_eq!(logging.all_tags(), vec!["Lazy".to_string()]);
    }

    // === Hooks ===

    #[test]
    fn test_untagged_message_always_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        logging.add_hook(move |r| {
            assert!(r.tag.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        logging.log(LogLevel::Debug, None, || "anything".into());
        logging.sync();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_all_hooks_stops_recording() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        logging.start_recording(true);
        logging.add_hook(|_| {});
        assert!(logging.is_recording());

        logging.remove_all_hooks();

        assert!(!logging.is_recording());
    }

    #[test]
    fn test_sync_inside_hook_returns() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        let inner = logging.clone();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        logging.add_hook(move |_| {
            inner.sync();
            assert!(inner.current_log().is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        logging.log(LogLevel::Error, None, || "x".into());
        logging.sync();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        logging.remove_all_hooks();
    }

    // === Files ===

    #[test]
    fn test_append_to_current_log_bypasses_recording() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());

        logging.append_to_current_log("crash marker\n");

        assert_eq!(text(logging.current_log()), "crash marker\n");
        assert_eq!(
            logging.paths_for_existing_logs(),
            vec![dir.path().join("current.log")]
        );
    }

    #[test]
    fn test_switch_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let logging = logging(dir.path());
        logging.append_to_current_log("X");

        logging.switch_current_to_previous();
        assert_eq!(text(logging.previous_log()), "X");
        assert!(logging.current_log().is_none());

        logging.clear_logs();
        assert!(logging.previous_log().is_none());
        logging.clear_logs();
        assert!(logging.paths_for_existing_logs().is_empty());
    }

    // === Config ===

    #[test]
    fn test_from_config_wires_directory_levels_and_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.logging.directory = Some(dir.path().to_path_buf());
        cfg.logging.default_level = LogLevel::Error;
        cfg.logging.record_on_start = true;
        cfg.tags.insert("Net".to_string(), LogLevel::Debug);

        let logging = Logging::from_config(&cfg);
        logging.tagged("Net").debug(|| "hi".into());
        logging.tagged("Other").warn(|| "dropped".into());
        logging.sync();

        assert_eq!(logging.log_directory(), dir.path());
        assert!(logging.is_recording());
        assert_eq!(logging.level("Net"), LogLevel::Debug);
        assert_eq!(logging.level("Other"), LogLevel::Error);
        let current = text(logging.current_log());
        assert!(current.ends_with("[DEBUG] [Net] hi\n"), "{current}");
        assert!(!current.contains("dropped"));
    }
}
