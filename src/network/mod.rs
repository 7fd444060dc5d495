//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread, gated by a counting semaphore
//! - One thread per admitted connection
//! - Requests answered by a pluggable `Handler`
//! - Cooperative shutdown: cancel, then drain with a deadline

mod server;
mod connection;
mod limiter;
mod shutdown;
mod client;

pub use server::{Handler, Server, ServerState};
pub use connection::Connection;
pub use limiter::{ConnectionLimiter, Permit};
pub use shutdown::{CancellationToken, TaskGuard, TaskTracker};
pub use client::Client;
