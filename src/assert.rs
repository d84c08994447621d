//! Fatal assertions
//!
//! `fatal` always terminates the process with `abort`, even when reached
//! from a hook on the log worker or when the embedding binary unwinds on
//! panic. `require_internal` only does so on internal builds and otherwise
//! reports through `tracing`.

use std::panic::Location;
use std::process;
use tracing::error;

/// Terminate with `message` and the caller's location
#[track_caller]
pub fn fatal(message: &str) -> ! {
    let location = Location::caller();
    error!("FATAL at {}:{}: {}", location.file(), location.line(), message);
    eprintln!("fatal: {} ({}:{})", message, location.file(), location.line());
    process::abort()
}

/// Terminate when `condition` is false
#[track_caller]
pub fn require(condition: bool, message: &str) {
    if !condition {
        fatal(message);
    }
}

/// Terminate when `condition` is false on an internal build
///
/// `is_internal` is supplied by the caller, typically from
/// `LogConfig::internal_build`.
#[track_caller]
pub fn require_internal(condition: bool, is_internal: bool, message: &str) {
    if condition {
        return;
    }
    if is_internal {
        fatal(message);
    }
    let location = Location::caller();
    error!(
        "Requirement failed at {}:{}: {}",
        location.file(),
        location.line(),
        message
    );
}
