//! # memkv
//!
//! A small in-memory key-value store with:
//! - A plain text protocol (`SET` / `GET` / `DEL`), one request per write
//! - Thread-per-connection serving behind an admission gate
//! - Cooperative, deadline-bounded graceful shutdown
//! - Shared-exclusive locking over a single map
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │        (accept loop + admission gate + shutdown)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Connection                                 │
//! │            (read request → handle → write response)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Query Handler                               │
//! │          (protocol codec + command routing)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │  MemoryStore  │
//!               │   (RwLock)    │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod handler;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, ParseError, Result};
pub use config::{ClientConfig, ServerConfig};
pub use handler::QueryHandler;
pub use network::{Client, Handler, Server, ServerState};
pub use store::{MemoryStore, Storage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
