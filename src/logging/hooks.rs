//! Hook registry
//!
//! Hooks are observers called by the log worker for every accepted message.
//! The registry lives on the worker, so add/remove and delivery never overlap.

use super::LogRecord;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Observer callback for accepted messages
pub type Hook = Box<dyn FnMut(&LogRecord) + Send + 'static>;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque handle returned by hook registration
///
/// Tokens are unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookToken(u64);

impl HookToken {
    pub(crate) fn next() -> Self {
        HookToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Token → callback mapping; delivery order is unspecified
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookToken, Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: HookToken, hook: Hook) {
        self.hooks.insert(token, hook);
    }

    /// No-op when the token is unknown
    pub fn remove(&mut self, token: HookToken) {
        self.hooks.remove(&token);
    }

    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Deliver `record` to every hook; a panicking hook does not stop the rest
    pub fn notify(&mut self, record: &LogRecord) {
        for (token, hook) in self.hooks.iter_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| hook(record))).is_err() {
                warn!("Log hook {:?} panicked; skipped for this message", token);
            }
        }
    }
}
