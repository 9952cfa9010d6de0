use super::MarkStorage;
use crate::interval::Interval;
use crate::mark_store::MarkStore;
use std::fs;
use tempfile::TempDir;

fn store_with(key: &str, start: usize, end: usize) -> MarkStore {
    let mut store = MarkStore::new();
    store.add(key, Interval::new(start, end));
    store
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let storage = MarkStorage::new(dir.path().join("marks.json"));
    assert!(storage.load().is_empty());
}

#[test]
fn test_corrupt_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("marks.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(MarkStorage::new(&path).load().is_empty());
}

#[test]
fn test_save_then_flush_is_durable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("marks.json");
    let mut storage = MarkStorage::new(&path);

    let store = store_with("src/lib.rs", 2, 8);
    storage.save(&store);
    storage.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"src/lib.rs":{"array":[{"start":2,"end":8}]}}"#
    );
    assert_eq!(MarkStorage::new(&path).load(), store);
}

#[test]
fn test_last_save_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("marks.json");
    let mut storage = MarkStorage::new(&path);

    for end in 1..20 {
        storage.save(&store_with("a.rs", 0, end));
    }
    storage.flush().unwrap();

    assert_eq!(storage.load(), store_with("a.rs", 0, 19));
}

#[test]
fn test_flush_without_pending_write() {
    let dir = TempDir::new().unwrap();
    let mut storage = MarkStorage::new(dir.path().join("marks.json"));
    assert!(storage.flush().is_ok());
}

#[test]
fn test_write_failure_surfaces_on_flush() {
    let dir = TempDir::new().unwrap();
    // A directory sitting where the state file should be makes the write fail.
    let path = dir.path().join("marks.json");
    fs::create_dir(&path).unwrap();
    let mut storage = MarkStorage::new(&path);

    storage.save(&store_with("a.rs", 0, 1));

    assert!(storage.flush().is_err());
    assert!(storage.save_now(&store_with("a.rs", 0, 1)).is_err());
}

#[test]
fn test_queued_writes_land_when_storage_is_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("marks.json");

    {
        let mut storage = MarkStorage::new(&path);
        for end in 1..50 {
            storage.save(&store_with("a.rs", 0, end));
        }
    }

    assert_eq!(MarkStorage::new(&path).load(), store_with("a.rs", 0, 49));
}

#[test]
fn test_write_failure_is_reported_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("marks.json");
    fs::create_dir(&path).unwrap();
    let mut storage = MarkStorage::new(&path);

    storage.save(&store_with("a.rs", 0, 1));
    assert!(storage.flush().is_err());

    assert!(storage.flush().is_ok());
}
