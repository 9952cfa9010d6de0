//! JSON form of the mark store.
//!
//! The persisted shape is an object keyed by file, each value wrapping its intervals in an
//! `array` field: `{"src/lib.rs": {"array": [{"start": 0, "end": 4}]}}`. Loading trusts the
//! records to be canonical already and does not re-run merging.

use crate::interval::{Interval, IntervalSet};
use crate::mark_store::MarkStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
/// Failure converting between a mark store and its JSON form.
pub enum CodecError {
    /// The text was not valid JSON or did not have the expected shape.
    #[error("invalid mark state: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
/// Persisted marks for one file.
struct StoredFile {
    array: Vec<Interval>,
}

/// Encodes every entry of `store`, empty ones included.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn serialize(store: &MarkStore) -> Result<String, CodecError> {
    let records: BTreeMap<&str, StoredFile> = store
        .iter()
        .map(|(key, set)| {
            (
                key,
                StoredFile {
                    array: set.iter().copied().collect(),
                },
            )
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}

/// Decodes persisted state, reporting malformed input.
///
/// Blank input counts as an empty store, since a freshly created state file has no content.
///
/// # Errors
///
/// Returns an error if the text is not JSON or does not match the persisted shape.
pub fn try_deserialize(text: &str) -> Result<MarkStore, CodecError> {
    if text.trim().is_empty() {
        return Ok(MarkStore::new());
    }
    let records: BTreeMap<String, StoredFile> = serde_json::from_str(text)?;

    let mut store = MarkStore::new();
    for (key, file) in records {
        store.insert(key, IntervalSet::from_trusted(file.array));
    }
    Ok(store)
}

#[must_use]
/// Decodes persisted state, treating anything malformed as "no prior marks".
pub fn deserialize(text: &str) -> MarkStore {
    try_deserialize(text).unwrap_or_else(|e| {
        log::warn!("Discarding unreadable mark state: {e}");
        MarkStore::new()
    })
}

#[cfg(test)]
#[path = "tests/codec.rs"]
mod tests;
