//! Two-generation log file persistence.
//!
//! Lines are appended to `current.log`; a rotation moves it to
//! `previous.log`. Every write is synced before returning.
//!
//! All failures are logged through `tracing` at debug level and swallowed:
//! persisting logs must never take the host down.

use crate::constants::{CURRENT_LOG_NAME, PREVIOUS_LOG_NAME};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owner of the single write handle to the current log
pub struct LogSink {
    directory: PathBuf,
    handle: Option<File>,
}

impl LogSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            handle: None,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn current_path(&self) -> PathBuf {
        self.directory.join(CURRENT_LOG_NAME)
    }

    pub fn previous_path(&self) -> PathBuf {
        self.directory.join(PREVIOUS_LOG_NAME)
    }

    /// Append `line` verbatim and sync it to disk
    pub fn append(&mut self, line: &str) {
        if let Err(e) = self.try_append(line) {
            debug!("Append to {:?} failed: {}", self.current_path(), e);
            // A broken handle is reopened on the next append
            self.handle = None;
        }
    }

    fn try_append(&mut self, line: &str) -> io::Result<()> {
        let path = self.current_path();
        if !path.exists() {
            // Removed behind our back: never keep writing to an unlinked file
            self.handle = None;
            fs::create_dir_all(&self.directory)?;
            File::create(&path)?;
        }

        let file = match self.handle.take() {
            Some(file) => file,
            None => open_for_update(&path)?,
        };
        let file = self.handle.insert(file);
        file.write_all(line.as_bytes())?;
        file.sync_data()
    }

    /// Sync any pending data of the open handle
    pub fn flush(&mut self) {
        if let Some(file) = self.handle.as_mut() {
            if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
                debug!("Flush of {:?} failed: {}", self.current_path(), e);
            }
        }
    }

    /// Move current → previous, replacing any previous generation
    ///
    /// The previous file is deleted before the rename; a crash in between
    /// loses the old generation.
    pub fn rotate(&mut self) {
        self.close();
        let current = self.current_path();
        let previous = self.previous_path();
        remove_if_exists(&previous);
        if current.exists() {
            if let Err(e) = fs::rename(&current, &previous) {
                debug!("Rotate {:?} -> {:?} failed: {}", current, previous, e);
            }
        }
    }

    /// Delete both generations; idempotent
    pub fn clear(&mut self) {
        self.close();
        remove_if_exists(&self.current_path());
        remove_if_exists(&self.previous_path());
    }

    pub fn read_current(&self) -> Option<Vec<u8>> {
        fs::read(self.current_path()).ok()
    }

    pub fn read_previous(&self) -> Option<Vec<u8>> {
        fs::read(self.previous_path()).ok()
    }

    /// Paths of generations that currently have content, current first
    pub fn existing_paths(&self) -> Vec<PathBuf> {
        [self.current_path(), self.previous_path()]
            .into_iter()
            .filter(|p| fs::metadata(p).map(|m| m.len() > 0).unwrap_or(false))
            .collect()
    }

    fn close(&mut self) {
        if let Some(mut file) = self.handle.take() {
            let _ = file.flush();
        }
    }
}

fn open_for_update(path: &Path) -> io::Result<File> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.seek(SeekFrom::End(0))?;
    Ok(file)
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => debug!("Remove {:?} failed: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> (tempfile::TempDir, LogSink) {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new(dir.path().join("logs"));
        (dir, sink)
    }

    // === Append ===

    #[test]
    fn test_append_creates_directory_and_file() {
        let (_dir, mut sink) = sink();
        assert!(sink.read_current().is_none());

        sink.append("first\n");
        sink.append("second\n");

        assert_eq!(sink.read_current().unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn test_append_reopens_after_external_delete() {
        let (_dir, mut sink) = sink();
        sink.append("old\n");
        fs::remove_file(sink.current_path()).unwrap();

        sink.append("new\n");

        assert_eq!(sink.read_current().unwrap(), b"new\n");
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let (_dir, mut sink) = sink();
        fs::create_dir_all(sink.directory()).unwrap();
        fs::write(sink.current_path(), "from last run\n").unwrap();

        sink.append("this run\n");

        assert_eq!(sink.read_current().unwrap(), b"from last run\nthis run\n");
    }

    // === Rotate ===

    #[test]
    fn test_rotate_moves_current_to_previous() {
        let (_dir, mut sink) = sink();
        sink.append("X");

        sink.rotate();

        assert_eq!(sink.read_previous().unwrap(), b"X");
        assert!(sink.read_current().is_none());
    }

    #[test]
    fn test_rotate_replaces_previous() {
        let (_dir, mut sink) = sink();
        sink.append("gen1");
        sink.rotate();
        sink.append("gen2");
        sink.rotate();

        assert_eq!(sink.read_previous().unwrap(), b"gen2");
    }

    #[test]
    fn test_rotate_without_current_drops_previous() {
        let (_dir, mut sink) = sink();
        sink.append("gen1");
        sink.rotate();

        sink.rotate();

        assert!(sink.read_previous().is_none());
        assert!(sink.read_current().is_none());
    }

    #[test]
    fn test_append_after_rotate_starts_fresh_file() {
        let (_dir, mut sink) = sink();
        sink.append("a");
        sink.rotate();
        sink.append("b");

        assert_eq!(sink.read_current().unwrap(), b"b");
        assert_eq!(sink.read_previous().unwrap(), b"a");
    }

    // === Clear ===

    #[test]
    fn test_clear_removes_both_and_is_idempotent() {
        let (_dir, mut sink) = sink();
        sink.append("a");
        sink.rotate();
        sink.append("b");

        sink.clear();
        assert!(sink.read_current().is_none());
        assert!(sink.read_previous().is_none());

        sink.clear();
        assert!(sink.read_current().is_none());
    }

    // === Existing paths ===

    #[test]
    fn test_existing_paths_skips_empty_files() {
        let (_dir, mut sink) = sink();
        assert!(sink.existing_paths().is_empty());

        sink.append("a");
        assert_eq!(sink.existing_paths(), vec![sink.current_path()]);

        sink.rotate();
        fs::write(sink.current_path(), "").unwrap();
        assert_eq!(sink.existing_paths(), vec![sink.previous_path()]);
    }
}
