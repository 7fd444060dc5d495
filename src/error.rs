//! Error types for memkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for memkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    /// The display text is what clients see in a `[not_found]` response.
    #[error("key is not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("message exceeds the maximum size of {limit} bytes")]
    MessageTooLarge { limit: usize },

    #[error("buffer is full")]
    ResponseTooLarge { limit: usize },

    // -------------------------------------------------------------------------
    // Server Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("shutdown deadline exceeded while connections were still draining")]
    ShutdownTimeout,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a raw request could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,

    #[error("unsupported command {0}")]
    UnsupportedCommand(String),

    #[error("invalid number of arguments")]
    InvalidArgumentCount,
}
