//! The in-memory record of every marked file in a workspace.
//!
//! Entries are created lazily on the first mark and are never dropped by a per-file unmark: an
//! unmarked file keeps an empty entry so the persisted state still lists it.

use crate::interval::{Interval, IntervalSet};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Mapping from workspace-relative file key to that file's marks.
pub struct MarkStore {
    files: BTreeMap<String, IntervalSet>,
}

impl MarkStore {
    #[must_use]
    /// Creates a store with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the marks for `key`, creating an empty entry if the file is new.
    pub fn get_or_create(&mut self, key: &str) -> &mut IntervalSet {
        self.files.entry(key.to_string()).or_default()
    }

    #[must_use]
    /// Returns the marks for `key` if the file has an entry.
    pub fn get(&self, key: &str) -> Option<&IntervalSet> {
        self.files.get(key)
    }

    /// Mutable access to an existing entry without creating one.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut IntervalSet> {
        self.files.get_mut(key)
    }

    #[must_use]
    /// Whether `key` has an entry, even an empty one.
    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// Marks `range` in `key`, creating the entry first if needed.
    pub fn add(&mut self, key: &str, range: Interval) {
        self.get_or_create(key).add(range);
    }

    /// Unmarks `range` in `key`; returns false when the file has no entry.
    pub fn remove(&mut self, key: &str, range: Interval) -> bool {
        match self.files.get_mut(key) {
            Some(set) => {
                set.remove(range);
                true
            }
            None => false,
        }
    }

    /// Empties the entry for `key`, keeping the key itself. No-op when absent.
    pub fn clear_file(&mut self, key: &str) {
        if let Some(set) = self.files.get_mut(key) {
            set.clear();
        }
    }

    /// Drops every entry.
    pub fn clear_all(&mut self) {
        self.files.clear();
    }

    pub(crate) fn insert(&mut self, key: String, set: IntervalSet) {
        self.files.insert(key, set);
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntervalSet)> {
        self.files.iter().map(|(key, set)| (key.as_str(), set))
    }

    #[must_use]
    /// Number of file entries, including empty ones.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    /// True when no file has an entry.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/mark_store.rs"]
mod tests;
