//! Query Handler
//!
//! Routes parsed commands to the store and turns every result into exactly
//! one response.
//!
//! ## Responsibilities
//! - Parse raw requests with the protocol codec
//! - Call `Storage` for SET / GET / DEL
//! - Translate store errors into outcome kinds (never propagate them)

use std::sync::Arc;

use crate::error::KvError;
use crate::network::{CancellationToken, Handler};
use crate::protocol::{parse_command, render_response, Command, Response};
use crate::store::Storage;

/// Parses, dispatches and renders client queries
pub struct QueryHandler {
    /// Store shared by every connection
    store: Arc<dyn Storage>,
}

impl QueryHandler {
    /// Create a handler serving queries against `store`
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Handle one raw request and produce its typed outcome
    pub fn respond(&self, request: &str) -> Response {
        match parse_command(request) {
            Ok(command) => self.execute(command),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse query");
                Response::parse_error(e)
            }
        }
    }

    /// Execute a command and return a response
    pub fn execute(&self, command: Command) -> Response {
        tracing::trace!(command = %command.command_type(), key = command.key(), "executing query");

        match command {
            Command::Set { key, value } => match self.store.set(&key, &value) {
                Ok(()) => Response::ok(None),
                Err(e) => self.internal_error("SET", e),
            },
            Command::Get { key } => match self.store.get(&key) {
                Ok(value) => Response::ok(Some(value)),
                Err(e @ KvError::NotFound) => {
                    tracing::warn!(key = %key, "key is not found");
                    Response::not_found(e)
                }
                Err(e) => self.internal_error("GET", e),
            },
            Command::Del { key } => match self.store.delete(&key) {
                Ok(()) => Response::ok(None),
                Err(e) => self.internal_error("DEL", e),
            },
        }
    }

    fn internal_error(&self, command: &str, error: KvError) -> Response {
        tracing::error!(command, error = %error, "failed to handle query");
        Response::internal_error(error)
    }
}

impl Handler for QueryHandler {
    fn handle(&self, _cancel: &CancellationToken, request: &str) -> String {
        render_response(&self.respond(request))
    }
}
