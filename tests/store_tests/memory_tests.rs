//! MemoryStore Tests
//!
//! Tests verify:
//! - Basic set/get/delete operations
//! - Overwrite semantics
//! - Idempotent delete
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use memkv::store::{MemoryStore, Storage};
use memkv::KvError;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn test_set_and_get() {
    let store = MemoryStore::new();

    store.set("key1", "value1").unwrap();

    assert_eq!(store.get("key1").unwrap(), "value1");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let store = MemoryStore::new();

    let result = store.get("nonexistent");
    assert!(matches!(result, Err(KvError::NotFound)));
}

#[test]
fn test_not_found_message() {
    assert_eq!(KvError::NotFound.to_string(), "key is not found");
}

#[test]
fn test_set_overwrites_existing() {
    let store = MemoryStore::new();

    store.set("key", "old").unwrap();
    store.set("key", "new").unwrap();

    assert_eq!(store.get("key").unwrap(), "new");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_empty_value_is_stored() {
    let store = MemoryStore::new();

    store.set("key", "").unwrap();
    assert_eq!(store.get("key").unwrap(), "");
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_existing_key() {
    let store = MemoryStore::new();

    store.set("key", "value").unwrap();
    store.delete("key").unwrap();

    assert!(matches!(store.get("key"), Err(KvError::NotFound)));
    assert!(store.is_empty());
}

#[test]
fn test_delete_absent_key_is_ok() {
    let store = MemoryStore::new();

    store.delete("never-set").unwrap();
    store.delete("never-set").unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_delete_leaves_other_keys() {
    let store = MemoryStore::new();

    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.delete("a").unwrap();

    assert_eq!(store.get("b").unwrap(), "2");
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_same_key() {
    let store = Arc::new(MemoryStore::new());
    let values: Vec<String> = (0..8).map(|i| format!("value-{i}-{}", "x".repeat(64))).collect();

    let handles: Vec<_> = values
        .iter()
        .cloned()
        .map(|value| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    store.set("shared", &value).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Exactly one of the written values, never a mix
    let stored = store.get("shared").unwrap();
    assert!(values.contains(&stored), "unexpected value {stored}");
}

#[test]
fn test_concurrent_readers_and_writers() {
    let store = Arc::new(MemoryStore::new());
    store.set("counter", "start").unwrap();

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    store.set(&format!("key-{t}-{i}"), &format!("{i}")).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(store.get("counter").unwrap(), "start");
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 401);
    assert_eq!(store.get("key-3-99").unwrap(), "99");
}
