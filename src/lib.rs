//! taglog - tagged logging with hooks and on-disk recording
//!
//! - [`Logging`] / [`TagLogger`]: per-tag levels, leveled entry points,
//!   hooks, and recording to `current.log` with rotation to `previous.log`.
//!   All state is owned by one worker thread; logging calls never block.
//! - [`leak`]: weak-reference leak tracker for test harnesses.
//! - [`privacy`]: `sanitized!` interpolation that redacts private values.
//! - [`assert`]: fatal assertion helpers.
//!
//! ```no_run
//! use taglog::{Logging, LoggingOptions, LogLevel};
//!
//! let logging = Logging::new(LoggingOptions::new("/tmp/taglog-demo"));
//! logging.start_recording(false);
//!
//! let net = logging.tagged("Network");
//! net.set_level(LogLevel::Info);
//! net.info(|| format!("connected in {} ms", 12));
//!
//! logging.sync();
//! assert!(logging.current_log().is_some());
//! ```

pub mod assert;
pub mod config;
pub mod constants;
pub mod error;
pub mod leak;
pub mod logging;
pub mod privacy;

pub use error::{LogError, Result};
pub use leak::LeakTracker;
pub use logging::{
    init_tracing, HookToken, LogLevel, LogRecord, Logging, LoggingOptions, SystemLog, TagLogger,
};
pub use privacy::{Public, SafeForLogging, SanitizedString};
