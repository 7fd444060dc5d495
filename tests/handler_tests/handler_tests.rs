//! Query Handler Tests
//!
//! Tests verify:
//! - Routing of SET / GET / DEL to the store
//! - Store errors become outcome kinds, never panics
//! - Parse errors are answered, not propagated

use std::sync::Arc;

use memkv::network::{CancellationToken, Handler};
use memkv::protocol::{Kind, Response};
use memkv::store::{MemoryStore, Storage};
use memkv::{KvError, QueryHandler, Result};

// =============================================================================
// Helper Functions
// =============================================================================

/// Store whose every operation fails
struct FailingStore;

impl Storage for FailingStore {
    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(KvError::Internal("unexpected".to_string()))
    }

    fn get(&self, _key: &str) -> Result<String> {
        Err(KvError::Internal("unexpected".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Err(KvError::Internal("unexpected".to_string()))
    }
}

fn memory_handler() -> QueryHandler {
    QueryHandler::new(Arc::new(MemoryStore::new()))
}

fn handle(handler: &QueryHandler, request: &str) -> String {
    handler.handle(&CancellationToken::new(), request)
}

// =============================================================================
// Routing Tests
// =============================================================================

#[test]
fn test_set_then_get() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, "SET key val"), "[ok]");
    assert_eq!(handle(&handler, "GET key"), "[ok] val");
}

#[test]
fn test_get_missing_key() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, "GET key"), "[not_found] key is not found");
}

#[test]
fn test_delete_present_then_get() {
    let handler = memory_handler();

    handle(&handler, "SET key val");
    assert_eq!(handle(&handler, "DEL key"), "[ok]");
    assert_eq!(handle(&handler, "GET key"), "[not_found] key is not found");
}

#[test]
fn test_delete_absent_key() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, "DEL ghost"), "[ok]");
}

#[test]
fn test_respond_returns_typed_outcome() {
    let handler = memory_handler();

    assert_eq!(handler.respond("SET k v"), Response::ok(None));
    assert_eq!(handler.respond("GET k"), Response::ok(Some("v".to_string())));
    assert_eq!(handler.respond("GET other").kind, Kind::NotFound);
    assert_eq!(handler.respond("PING").kind, Kind::ParseError);
}

#[test]
fn test_shared_store_is_visible_to_other_handlers() {
    let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
    let writer = QueryHandler::new(Arc::clone(&store));
    let reader = QueryHandler::new(store);

    handle(&writer, "SET user1 alice");
    assert_eq!(handle(&reader, "GET user1"), "[ok] alice");
}

// =============================================================================
// Error Translation Tests
// =============================================================================

#[test]
fn test_store_failures_become_internal_errors() {
    let handler = QueryHandler::new(Arc::new(FailingStore));

    assert_eq!(handle(&handler, "SET key val"), "[internal_error] unexpected");
    assert_eq!(handle(&handler, "GET key"), "[internal_error] unexpected");
    assert_eq!(handle(&handler, "DEL key"), "[internal_error] unexpected");
}

#[test]
fn test_unsupported_command() {
    let handler = memory_handler();

    assert_eq!(
        handle(&handler, "UNKNOWN t1 t2"),
        "[parse_error] unsupported command UNKNOWN"
    );
}

#[test]
fn test_wrong_arity() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, "SET a"), "[parse_error] invalid number of arguments");
}

#[test]
fn test_empty_request() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, ""), "[parse_error] empty request");
}

#[test]
fn test_parse_error_does_not_affect_later_requests() {
    let handler = memory_handler();

    assert_eq!(handle(&handler, "FOO x"), "[parse_error] unsupported command FOO");
    assert_eq!(handle(&handler, "SET a b"), "[ok]");
    assert_eq!(handle(&handler, "GET a"), "[ok] b");
}
