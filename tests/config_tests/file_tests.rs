//! Config File Tests
//!
//! Tests loading server settings from YAML.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use memkv::config::{FileConfig, LogFormat, DEFAULT_LISTEN_ADDR, DEFAULT_MAX_CONNECTIONS};
use memkv::KvError;
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_load_example_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.yaml");
    let config = FileConfig::from_path(path).unwrap();

    assert_eq!(config.engine.kind, "in_memory");
    assert_eq!(config.network.addr, "127.0.0.1:7991");
    assert_eq!(config.network.idle_timeout, Some(Duration::from_secs(300)));
    assert_eq!(config.network.write_timeout, Some(Duration::from_millis(500)));
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Text);
}

#[test]
fn test_load_file_into_server_config() {
    let file = write_config(
        "network:\n  addr: 0.0.0.0:9000\n  max_connections: 8\n  max_message_size: 1024\n  idle_timeout: 30s\nlogging:\n  format: json\n",
    );

    let config = FileConfig::from_path(file.path()).unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    let server = config.server_config();
    assert_eq!(server.listen_addr, "0.0.0.0:9000");
    assert_eq!(server.max_connections, 8);
    assert_eq!(server.max_message_size, 1024);
    assert_eq!(server.idle_timeout, Some(Duration::from_secs(30)));
    assert_eq!(server.write_timeout, None);
}

#[test]
fn test_missing_fields_take_defaults() {
    let config = FileConfig::from_yaml_str("network:\n  max_connections: 3\n").unwrap();

    assert_eq!(config.engine.kind, "in_memory");
    assert_eq!(config.network.addr, DEFAULT_LISTEN_ADDR);
    assert_eq!(config.network.max_connections, 3);
    assert_eq!(config.logging.level, "info");

    let empty = FileConfig::from_yaml_str("").unwrap();
    assert_eq!(empty.network.max_connections, DEFAULT_MAX_CONNECTIONS);
}

#[test]
fn test_zero_timeout_disables_deadline() {
    let config = FileConfig::from_yaml_str("network:\n  idle_timeout: 0\n  write_timeout: 250\n").unwrap();

    assert_eq!(config.network.idle_timeout, None);
    assert_eq!(config.network.write_timeout, Some(Duration::from_millis(250)));
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_unknown_engine_type() {
    let err = FileConfig::from_yaml_str("engine:\n  type: on_disk\n").unwrap_err();
    assert!(matches!(err, KvError::Config(_)));
    assert_eq!(err.to_string(), "Configuration error: unsupported engine type on_disk");
}

#[test]
fn test_unknown_key_is_rejected() {
    let err = FileConfig::from_yaml_str("network:\n  max_conns: 3\n").unwrap_err();
    assert!(matches!(err, KvError::Config(_)));
}

#[test]
fn test_bad_duration_is_rejected() {
    let err = FileConfig::from_yaml_str("network:\n  idle_timeout: soon\n").unwrap_err();
    assert!(matches!(err, KvError::Config(_)));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileConfig::from_path(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(KvError::Io(_))));
}
