//! memkv Server Binary
//!
//! Starts the TCP server for memkv.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use memkv::config::{FileConfig, LogFormat};
use memkv::{MemoryStore, QueryHandler, Server};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// memkv Server
///
/// Flags override values from `--config`; anything unset in both uses the
/// built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "memkv-server")]
#[command(about = "In-memory key-value store over a text TCP protocol")]
#[command(version)]
struct Args {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (host:port) [default: 127.0.0.1:7991]
    #[arg(short, long)]
    listen: Option<String>,

    /// Maximum concurrent connections [default: 100]
    #[arg(short, long)]
    max_connections: Option<usize>,

    /// Request buffer size in bytes [default: 4096]
    #[arg(long)]
    max_message_size: Option<usize>,

    /// Idle timeout per connection in milliseconds (0 disables)
    #[arg(long)]
    idle_timeout_ms: Option<u64>,

    /// Write timeout per response in milliseconds (0 disables)
    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// How long shutdown waits for connections to drain, in seconds
    #[arg(long, default_value = "30")]
    shutdown_timeout_secs: u64,

    /// Log level used when RUST_LOG is not set [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format [default: text]
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Lay the flags that were given over the file settings
    fn apply(&self, file: &mut FileConfig) {
        let network = &mut file.network;
        if let Some(listen) = &self.listen {
            network.addr = listen.clone();
        }
        if let Some(count) = self.max_connections {
            network.max_connections = count;
        }
        if let Some(bytes) = self.max_message_size {
            network.max_message_size = bytes;
        }
        if let Some(ms) = self.idle_timeout_ms {
            network.idle_timeout = Some(Duration::from_millis(ms)).filter(|d| !d.is_zero());
        }
        if let Some(ms) = self.write_timeout_ms {
            network.write_timeout = Some(Duration::from_millis(ms)).filter(|d| !d.is_zero());
        }

        if let Some(level) = &self.log_level {
            file.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            file.logging.format = format;
        }
    }
}

fn main() {
    let args = Args::parse();

    // Logging is not up yet, so config errors go to stderr
    let mut file_config = match &args.config {
        Some(path) => match FileConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    args.apply(&mut file_config);

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&file_config.logging.level));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);
    match file_config.logging.format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let config = file_config.server_config();
    tracing::info!("memkv Server v{}", memkv::VERSION);
    tracing::info!(engine = %file_config.engine.kind, "Listen address: {}", config.listen_addr);

    let server = match Server::bind(config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to register signal handlers: {}", e);
            std::process::exit(1);
        }
    };

    let handler = Arc::new(QueryHandler::new(Arc::new(MemoryStore::new())));
    let acceptor = {
        let server = Arc::clone(&server);
        thread::spawn(move || server.serve(handler))
    };

    if let Some(signal) = signals.forever().next() {
        tracing::info!(signal, "Caught signal, shutting down");
    }

    if let Err(e) = server.shutdown(Duration::from_secs(args.shutdown_timeout_secs)) {
        tracing::error!("Failed to shut down server: {}", e);
    }

    match acceptor.join() {
        Ok(Err(e)) => tracing::error!("Server error: {}", e),
        Err(_) => tracing::error!("Accept loop panicked"),
        Ok(Ok(())) => {}
    }

    tracing::info!("Server stopped");
}
