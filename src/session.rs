//! A review session: the mark store for one workspace and the commands that change it.
//!
//! The session owns the only live copy of the marks. It loads them once when opened, persists
//! after every command that changes them, and flushes on close. Commands invoked without a
//! workspace fail with a context error and leave everything untouched.

use crate::document::{Document, Selection};
use crate::interval::Interval;
use crate::mark_store::MarkStore;
use crate::storage::{MarkStorage, StorageError};
use crate::view::{self, HighlightSpan, HighlightTarget, RenderReport, ViewError};
use crate::workspace::Workspace;
use std::io;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
/// Problems a command reports back to the user.
pub enum CommandError {
    /// No workspace is open, so there is nowhere to keep marks.
    #[error("Please open the file in a workspace!")]
    NotInWorkspace,
    /// The document could not be saved before marking.
    #[error("failed to save {key} before marking: {source}")]
    Save {
        /// File key of the document.
        key: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Mark state for one opened workspace.
pub struct Session {
    workspace: Option<Workspace>,
    store: MarkStore,
    storage: Option<MarkStorage>,
}

impl Session {
    #[must_use]
    /// Opens `workspace` and loads its persisted marks.
    pub fn open(workspace: Workspace) -> Self {
        let storage = MarkStorage::new(workspace.storage_path());
        let store = storage.load();
        Self {
            workspace: Some(workspace),
            store,
            storage: Some(storage),
        }
    }

    #[must_use]
    /// Session without a workspace; every command reports a context error.
    pub fn detached() -> Self {
        Self {
            workspace: None,
            store: MarkStore::new(),
            storage: None,
        }
    }

    #[must_use]
    /// The opened workspace, if any.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    #[must_use]
    /// Current marks.
    pub fn store(&self) -> &MarkStore {
        &self.store
    }

    /// File key for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open.
    pub fn key_for(&self, path: &Path) -> Result<String, CommandError> {
        self.workspace
            .as_ref()
            .map(|workspace| workspace.relativize(path))
            .ok_or(CommandError::NotInWorkspace)
    }

    /// Marks the lines touched by each selection in the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open or the document cannot be saved.
    pub fn mark_selection(
        &mut self,
        document: &mut dyn Document,
        path: &Path,
        selections: &[Selection],
    ) -> Result<(), CommandError> {
        let key = self.key_for(path)?;
        save_document(document, &key)?;
        let set = self.store.get_or_create(&key);
        for selection in selections {
            set.add(selection.lines());
        }
        log::info!("Marked {} selection(s) in {key}", selections.len());
        self.persist();
        Ok(())
    }

    /// Unmarks the lines touched by each selection; a file with no marks is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open.
    pub fn unmark_selection(
        &mut self,
        path: &Path,
        selections: &[Selection],
    ) -> Result<(), CommandError> {
        let key = self.key_for(path)?;
        let Some(set) = self.store.get_mut(&key) else {
            return Ok(());
        };
        for selection in selections {
            set.remove(selection.lines());
        }
        log::info!("Unmarked {} selection(s) in {key}", selections.len());
        self.persist();
        Ok(())
    }

    /// Marks every line of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open or the document cannot be saved.
    pub fn mark_file(
        &mut self,
        document: &mut dyn Document,
        path: &Path,
    ) -> Result<(), CommandError> {
        let key = self.key_for(path)?;
        save_document(document, &key)?;
        let last_line = document.line_count().saturating_sub(1);
        self.store.add(&key, Interval::new(0, last_line));
        log::info!("Marked all of {key}");
        self.persist();
        Ok(())
    }

    /// Clears every mark in the file at `path`; a file with no entry is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open.
    pub fn unmark_file(&mut self, path: &Path) -> Result<(), CommandError> {
        let key = self.key_for(path)?;
        if !self.store.contains(&key) {
            return Ok(());
        }
        self.store.clear_file(&key);
        log::info!("Unmarked all of {key}");
        self.persist();
        Ok(())
    }

    /// Clears every mark in the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is open.
    pub fn unmark_workspace(&mut self) -> Result<(), CommandError> {
        if self.workspace.is_none() {
            return Err(CommandError::NotInWorkspace);
        }
        self.store.clear_all();
        log::info!("Unmarked the whole workspace");
        self.persist();
        Ok(())
    }

    /// Reconciled highlight spans for the document at `path`.
    ///
    /// Healed intervals are written back to the store and persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if a reconciled line cannot be found in the document.
    pub fn highlights(
        &mut self,
        document: &dyn Document,
        path: &Path,
    ) -> Result<Vec<HighlightSpan>, ViewError> {
        let Ok(key) = self.key_for(path) else {
            return Ok(Vec::new());
        };
        let before = self.store.get(&key).cloned();
        let spans = view::project(&mut self.store, &key, document)?;
        if self.store.get(&key) != before.as_ref() {
            self.persist();
        }
        Ok(spans)
    }

    /// Refreshes highlights on every visible target, persisting any healed marks.
    pub fn render<T: HighlightTarget>(&mut self, targets: &mut [T]) -> RenderReport {
        let before = self.store.clone();
        let report = view::render_all(&mut self.store, targets);
        if self.store != before {
            self.persist();
        }
        report
    }

    /// Blocks until the latest state write has landed.
    ///
    /// # Errors
    ///
    /// Returns the failure of the last write, if any.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        match self.storage.as_mut() {
            Some(storage) => storage.flush(),
            None => Ok(()),
        }
    }

    /// Writes the final state and waits for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn close(mut self) -> Result<(), StorageError> {
        match self.storage.as_mut() {
            Some(storage) => storage.save_now(&self.store),
            None => Ok(()),
        }
    }

    fn persist(&mut self) {
        if let Some(storage) = self.storage.as_mut() {
            storage.save(&self.store);
        }
    }
}

fn save_document(document: &mut dyn Document, key: &str) -> Result<(), CommandError> {
    document.save().map_err(|source| CommandError::Save {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/session.rs"]
mod tests;
