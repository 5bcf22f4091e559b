use std::fs;

use onmark_engine::{ensure_data_dir, AtomicFileWriter, FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

#[test]
fn creates_missing_data_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_data_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("progress.json", "{}").unwrap();
    assert_eq!(first.file_name().unwrap(), "progress.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "{}");

    let second = writer.write("progress.json", "{\"a\":1}").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "{\"a\":1}");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("progress.json", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("progress.json").exists());
}

#[test]
fn file_store_round_trips_and_reports_absence() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path().join("data"));

    assert_eq!(store.get("onmark_progress_v1").unwrap(), None);
    store.set("onmark_progress_v1", "{\"uploadConfirmed\":true}").unwrap();
    assert_eq!(
        store.get("onmark_progress_v1").unwrap().as_deref(),
        Some("{\"uploadConfirmed\":true}")
    );
    assert!(temp.path().join("data/onmark_progress_v1.json").is_file());

    store.set("onmark_progress_v1", "{}").unwrap();
    assert_eq!(store.get("onmark_progress_v1").unwrap().as_deref(), Some("{}"));
}

#[test]
fn file_store_rejects_path_like_keys() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    assert!(store.set("../escape", "x").is_err());
    assert!(store.get("").is_err());
}

#[test]
fn memory_store_behaves_like_file_store() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    store.set("k", "w").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
}
