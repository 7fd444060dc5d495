//! memkv CLI Client
//!
//! Reads requests from stdin, one per line, and prints each response.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Parser;
use memkv::{Client, ClientConfig};

/// memkv CLI
#[derive(Parser, Debug)]
#[command(name = "memkv-cli")]
#[command(about = "Command line client for the memkv key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = memkv::config::DEFAULT_LISTEN_ADDR)]
    address: String,

    /// Timeout to establish the connection, in milliseconds
    #[arg(long, default_value = "10000")]
    dial_timeout_ms: u64,

    /// Timeout waiting for a response, in milliseconds
    #[arg(long, default_value = "10000")]
    read_timeout_ms: u64,

    /// Timeout sending a request, in milliseconds
    #[arg(long, default_value = "10000")]
    write_timeout_ms: u64,

    /// Max bytes accepted for one response
    #[arg(long, default_value_t = memkv::config::DEFAULT_MAX_MESSAGE_SIZE)]
    read_buffer_size: usize,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> memkv::Result<()> {
    let config = ClientConfig::builder()
        .dial_timeout(Duration::from_millis(args.dial_timeout_ms))
        .read_timeout(Duration::from_millis(args.read_timeout_ms))
        .write_timeout(Duration::from_millis(args.write_timeout_ms))
        .read_buffer_size(args.read_buffer_size)
        .build();

    let mut client = Client::connect(&args.address, config)?;
    let stdout = io::stdout();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let request = line.trim();
        if request.is_empty() {
            continue;
        }

        let response = client.send(request)?;
        writeln!(stdout.lock(), "{}", response)?;
    }

    client.close()
}
