//! Recording: persisting accepted messages to the current log.
//!
//! Recording is one hook like any other. Non-internal builds leave error
//! messages out of the file, since they tend to carry the most detail.

use super::worker::LogState;
use super::{HookToken, LogLevel, LogRecord};

/// Whether a message is written to disk while recording
pub fn should_record(level: LogLevel, internal_build: bool) -> bool {
    internal_build || level != LogLevel::Error
}

/// Install the recording hook; no-op when already recording
pub(crate) fn start(state: &mut LogState, internal_build: bool) {
    if state.recording.is_some() {
        return;
    }
    let sink = state.sink.clone();
    let token = HookToken::next();
    state.hooks.insert(
        token,
        Box::new(move |record: &LogRecord| {
            if should_record(record.level, internal_build) {
                sink.lock().append(&record.recorded_line());
            }
        }),
    );
    state.recording = Some(token);
}

/// Remove the recording hook and delete both generations; no-op when idle
pub(crate) fn stop(state: &mut LogState) {
    if let Some(token) = state.recording.take() {
        state.sink.lock().clear();
        state.hooks.remove(token);
    }
}
