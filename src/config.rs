//! Configuration for memkv
//!
//! Centralized configuration with sensible defaults. Nothing here is global:
//! a config value is built once and handed to the server or client at
//! construction.
//!
//! The server binary can also load a YAML file (`FileConfig`):
//! ```yaml
//! engine:
//!   type: in_memory
//! network:
//!   addr: 127.0.0.1:7991
//!   max_connections: 100
//!   max_message_size: 4096
//!   idle_timeout: 5m
//!   write_timeout: 500ms
//! logging:
//!   level: info
//!   format: text
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{KvError, Result};

/// Default TCP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7991";

/// Default cap on simultaneously served connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Default cap on a single request (and client response buffer), in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

/// Server-side configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address (`host:port`, port 0 picks a free one)
    pub listen_addr: String,

    /// Max concurrent client connections (admission gate size, at least 1)
    pub max_connections: usize,

    /// Request buffer size in bytes. A read that fills it is rejected, so
    /// a request must be strictly shorter.
    pub max_message_size: usize,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// How long a connection may sit idle waiting for the next request.
    /// `None` disables the read deadline.
    pub idle_timeout: Option<Duration>,

    /// Deadline for writing one response. `None` disables it.
    pub write_timeout: Option<Duration>,

    /// How often an idle accept loop re-checks for shutdown
    pub accept_poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            idle_timeout: None,
            write_timeout: None,
            accept_poll_interval: Duration::from_millis(10),
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the maximum request size (in bytes)
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.config.max_message_size = bytes;
        self
    }

    /// Set the idle/read timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Set the write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    pub fn accept_poll_interval(mut self, interval: Duration) -> Self {
        self.config.accept_poll_interval = interval;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

/// Client-side configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout to establish the connection. `None` uses the OS default.
    pub dial_timeout: Option<Duration>,

    /// Timeout waiting for a response
    pub read_timeout: Option<Duration>,

    /// Timeout sending a request
    pub write_timeout: Option<Duration>,

    /// Response buffer size; a response that fills it is rejected
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dial_timeout: None,
            read_timeout: None,
            write_timeout: None,
            read_buffer_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.config.dial_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    pub fn read_buffer_size(mut self, bytes: usize) -> Self {
        self.config.read_buffer_size = bytes;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// =============================================================================
// Config File
// =============================================================================

/// Only engine the server ships with
pub const ENGINE_IN_MEMORY: &str = "in_memory";

/// Server settings loaded from a YAML file
///
/// Every field is optional; missing ones take the same defaults as
/// `ServerConfig`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub engine: EngineSection,
    pub network: NetworkSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            kind: ENGINE_IN_MEMORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub addr: String,
    pub max_connections: usize,
    pub max_message_size: usize,

    /// `500ms`, `30s`, `5m`, `1h`, or a bare number of milliseconds.
    /// Zero disables the deadline.
    #[serde(deserialize_with = "deserialize_timeout")]
    pub idle_timeout: Option<Duration>,

    #[serde(deserialize_with = "deserialize_timeout")]
    pub write_timeout: Option<Duration>,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            idle_timeout: None,
            write_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive used when RUST_LOG is not set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FileConfig {
    /// Load and validate a YAML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty file is a document with no keys, not an error
        let config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(contents)
                .map_err(|e| KvError::Config(format!("invalid config file: {e}")))?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.engine.kind != ENGINE_IN_MEMORY {
            return Err(KvError::Config(format!(
                "unsupported engine type {}",
                self.engine.kind
            )));
        }
        Ok(())
    }

    /// Server settings from the `network` section
    pub fn server_config(&self) -> ServerConfig {
        let network = &self.network;
        let mut builder = ServerConfig::builder()
            .listen_addr(&network.addr)
            .max_connections(network.max_connections)
            .max_message_size(network.max_message_size);
        if let Some(timeout) = network.idle_timeout {
            builder = builder.idle_timeout(timeout);
        }
        if let Some(timeout) = network.write_timeout {
            builder = builder.write_timeout(timeout);
        }
        builder.build()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Millis(u64),
    Text(String),
}

fn deserialize_timeout<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let timeout = match Option::<RawTimeout>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawTimeout::Millis(ms)) => Duration::from_millis(ms),
        Some(RawTimeout::Text(text)) => parse_duration(&text).map_err(serde::de::Error::custom)?,
    };
    Ok(Some(timeout).filter(|d| !d.is_zero()))
}

/// Parse `<digits><unit>` with unit one of `ms`, `s`, `m`, `h`
fn parse_duration(text: &str) -> std::result::Result<Duration, String> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration {text:?}"))?;
    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3600)),
        _ => return Err(format!("invalid duration unit in {text:?}")),
    };
    Ok(duration)
}
