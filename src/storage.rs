//! The per-workspace state file.
//!
//! State is loaded once when a session opens and written wholesale after every change. Writes
//! are queued to one long-lived background thread so marking never waits on the disk; `flush`
//! is the one place that does wait, for callers that need the file to be current (teardown and
//! tests).

use crate::codec::{self, CodecError};
use crate::mark_store::MarkStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

#[derive(Debug, thiserror::Error)]
/// Failure persisting mark state.
pub enum StorageError {
    /// The state could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The state file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// State file location.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The background writer could not be started or has stopped.
    #[error("background writer for {0} is not running")]
    Writer(PathBuf),
}

enum Job {
    Write(String),
    Flush(mpsc::Sender<Option<StorageError>>),
}

#[derive(Debug)]
struct Writer {
    jobs: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
}

/// Reads and writes the mark state file for one workspace.
#[derive(Debug)]
pub struct MarkStorage {
    path: PathBuf,
    writer: Option<Writer>,
}

impl MarkStorage {
    #[must_use]
    /// Storage backed by the file at `path`, which need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    #[must_use]
    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    /// Loads prior state; a missing, unreadable or corrupt file gives an empty store.
    pub fn load(&self) -> MarkStore {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let store = codec::deserialize(&contents);
                log::info!(
                    "Loaded marks for {} file(s) from {}",
                    store.len(),
                    self.path.display()
                );
                store
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => MarkStore::new(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                MarkStore::new()
            }
        }
    }

    /// Snapshots `store` and queues it for the background writer.
    ///
    /// Snapshots are written one at a time in the order they were queued, and the caller never
    /// waits on the disk. Failures are logged and held for the next `flush`.
    pub fn save(&mut self, store: &MarkStore) {
        let json = match codec::serialize(store) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize marks: {e}");
                return;
            }
        };
        if let Err(e) = self.send(Job::Write(json)) {
            log::error!("{e}");
        }
    }

    /// Blocks until every queued write has finished.
    ///
    /// # Errors
    ///
    /// Returns the latest write failure since the previous flush, if any.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.writer.is_none() {
            return Ok(());
        }
        let (reply, outcome) = mpsc::channel();
        self.send(Job::Flush(reply))?;
        match outcome.recv() {
            Ok(None) => Ok(()),
            Ok(Some(e)) => Err(e),
            Err(_) => {
                self.writer = None;
                Err(StorageError::Writer(self.path.clone()))
            }
        }
    }

    /// Writes `store` on the calling thread once queued writes have landed.
    ///
    /// # Errors
    ///
    /// Returns an error if an earlier write failed, or if encoding or writing fails.
    pub fn save_now(&mut self, store: &MarkStore) -> Result<(), StorageError> {
        self.flush()?;
        let json = codec::serialize(store)?;
        write_state(&self.path, &json)
    }

    fn send(&mut self, job: Job) -> Result<(), StorageError> {
        if self.writer.is_none() {
            self.writer = Some(spawn_writer(self.path.clone())?);
        }
        let sent = self
            .writer
            .as_ref()
            .is_some_and(|writer| writer.jobs.send(job).is_ok());
        if sent {
            Ok(())
        } else {
            self.writer = None;
            Err(StorageError::Writer(self.path.clone()))
        }
    }
}

impl Drop for MarkStorage {
    fn drop(&mut self) {
        if let Some(Writer { jobs, handle }) = self.writer.take() {
            // Closing the queue lets the writer drain it and exit.
            drop(jobs);
            if handle.join().is_err() {
                log::error!("Mark writer for {} panicked", self.path.display());
            }
        }
    }
}

fn spawn_writer(path: PathBuf) -> Result<Writer, StorageError> {
    let (jobs, queue) = mpsc::channel::<Job>();
    let thread_path = path.clone();
    let handle = std::thread::Builder::new()
        .name("auditmark-save".into())
        .spawn(move || {
            let mut failure = None;
            for job in queue {
                match job {
                    Job::Write(json) => {
                        if let Err(e) = write_state(&thread_path, &json) {
                            log::error!("{e}");
                            failure = Some(e);
                        }
                    }
                    Job::Flush(reply) => {
                        let _ = reply.send(failure.take());
                    }
                }
            }
        })
        .map_err(|e| {
            log::error!("Failed to start mark writer: {e}");
            StorageError::Writer(path)
        })?;
    Ok(Writer { jobs, handle })
}

fn write_state(path: &Path, json: &str) -> Result<(), StorageError> {
    let to_error = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, json).map_err(to_error)?;
    log::debug!("Saved marks to {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "tests/storage.rs"]
mod tests;
