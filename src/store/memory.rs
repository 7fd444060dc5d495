//! In-memory store implementation
//!
//! HashMap-based store with a single RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{KvError, Result};
use super::Storage;

/// In-memory key-value store
///
/// ## Concurrency:
/// - `data`: one RwLock over the whole map (many concurrent readers, exclusive writer)
/// - All methods use `&self`
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Storage for MemoryStore {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String> {
        self.data.read().get(key).cloned().ok_or(KvError::NotFound)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}
