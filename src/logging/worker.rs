//! Serialized log worker.
//!
//! Every mutation of log state (tag levels, hooks, log files) runs as a job
//! on one dedicated thread, strictly one at a time and in submission order.
//! Submitting never blocks; `sync` and `query` wait for the queue to reach
//! their job.

use super::{HookRegistry, HookToken, LogRecord, LogSink, SystemLog, TagRegistry};
use crate::constants::WORKER_THREAD_NAME;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::warn;

pub(crate) type Job = Box<dyn FnOnce(&mut LogState) + Send + 'static>;

/// State owned by the worker thread
pub(crate) struct LogState {
    pub tags: TagRegistry,
    pub hooks: HookRegistry,
    /// Shared with the recording hook, which appends from inside `hooks`
    pub sink: Arc<Mutex<LogSink>>,
    pub recording: Option<HookToken>,
    pub system_log: Box<dyn SystemLog>,
}

impl LogState {
    /// Register the tag, filter, then fan out to the system log and hooks
    pub fn emit(&mut self, record: LogRecord) {
        if let Some(tag) = record.tag() {
            self.tags.register(tag);
        }
        if !self.tags.should_log(record.level, record.tag()) {
            return;
        }
        self.system_log
            .send_message(&record.system_line(), record.level);
        self.hooks.notify(&record);
    }
}

pub(crate) struct Worker {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the worker thread
    ///
    /// If the thread cannot be created the worker stays inert: submitted
    /// jobs are dropped and queries answer `None`.
    pub fn spawn(mut state: LogState) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();

        match thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(rx, &mut state))
        {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                warn!("Cannot spawn log worker, logging disabled: {}", e);
                Self {
                    tx: None,
                    handle: None,
                }
            }
        }
    }

    /// Fire-and-forget
    pub fn submit(&self, job: impl FnOnce(&mut LogState) + Send + 'static) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Box::new(job));
        }
    }

    /// Run `f` on the worker and wait for its result
    ///
    /// Answers `None` when called from the worker itself (e.g. inside a
    /// hook), since waiting there would never finish.
    pub fn query<R, F>(&self, f: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut LogState) -> R + Send + 'static,
    {
        if self.is_worker_thread() {
            return None;
        }
        let tx = self.tx.as_ref()?;
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        tx.send(Box::new(move |state: &mut LogState| {
            let _ = reply_tx.send(f(state));
        }))
        .ok()?;
        reply_rx.recv().ok()
    }

    /// Block until every job submitted before this call has run
    pub fn sync(&self) {
        let _ = self.query(|_| ());
    }

    pub fn is_worker_thread(&self) -> bool {
        self.thread_id() == Some(thread::current().id())
    }

    fn thread_id(&self) -> Option<ThreadId> {
        self.handle.as_ref().map(|h| h.thread().id())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the channel lets the thread drain the queue and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn run_worker(rx: Receiver<Job>, state: &mut LogState) {
    while let Ok(job) = rx.recv() {
        // Hook panics are caught per hook in `HookRegistry::notify`
        if panic::catch_unwind(AssertUnwindSafe(|| job(state))).is_err() {
            warn!("Log job panicked; continuing");
        }
    }
    state.sink.lock().flush();
}
