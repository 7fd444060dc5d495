//! Store Module
//!
//! Thread-safe mapping from string key to string value.
//!
//! ## Responsibilities
//! - Insert/overwrite, lookup and idempotent delete of single keys
//! - Shared-exclusive access: concurrent readers, one writer at a time
//!
//! ## Data Structure Choice
//! A `HashMap` behind one `RwLock` for the whole mapping:
//! - No per-key locking and no sharding
//! - Every operation is linearizable with respect to every other
//! - Writers serialize, which bounds throughput under heavy write load

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;

/// Operations the query dispatcher needs from a store
///
/// Implementations must be shareable across connection threads.
pub trait Storage: Send + Sync {
    /// Insert or overwrite `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Current value of `key`, or `KvError::NotFound`
    fn get(&self, key: &str) -> Result<String>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;
}
