//! Client Tests
//!
//! Tests the transport client against a bare listener.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::Duration;

use memkv::{Client, ClientConfig, KvError};

const SERVER_RESPONSE: &str = "hello, client";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Answer every request with SERVER_RESPONSE, one client at a time
fn spawn_fixed_responder() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { return };

            let mut buf = [0u8; 1024];
            while matches!(stream.read(&mut buf), Ok(n) if n > 0) {
                if stream.write_all(SERVER_RESPONSE.as_bytes()).is_err() {
                    break;
                }
            }
        }
    });

    addr
}

#[test]
fn test_client_with_io_timeouts() {
    let addr = spawn_fixed_responder();
    let config = ClientConfig::builder()
        .read_timeout(TIMEOUT)
        .write_timeout(TIMEOUT)
        .build();

    let mut client = Client::connect(addr, config).unwrap();
    assert_eq!(client.peer_addr(), addr);
    assert_eq!(client.send("hello, server").unwrap(), SERVER_RESPONSE);
    assert_eq!(client.send("again").unwrap(), SERVER_RESPONSE);
    client.close().unwrap();
}

#[test]
fn test_client_with_dial_timeout() {
    let addr = spawn_fixed_responder();
    let config = ClientConfig::builder().dial_timeout(TIMEOUT).build();

    let mut client = Client::connect(addr, config).unwrap();
    assert_eq!(client.send("hello, server").unwrap(), SERVER_RESPONSE);
    client.close().unwrap();
}

#[test]
fn test_client_with_small_buffer() {
    let addr = spawn_fixed_responder();
    let config = ClientConfig::builder()
        .read_buffer_size(5)
        .read_timeout(TIMEOUT)
        .build();

    let mut client = Client::connect(addr, config).unwrap();
    let err = client.send("hello, server").unwrap_err();
    assert!(matches!(err, KvError::ResponseTooLarge { limit: 5 }));
    assert_eq!(err.to_string(), "buffer is full");
}

#[test]
fn test_client_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let result = Client::connect(addr, ClientConfig::builder().dial_timeout(TIMEOUT).build());
    assert!(matches!(result, Err(KvError::Io(_))));
}

#[test]
fn test_client_server_closes_without_response() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf);
            // dropped here without answering
        }
    });

    let config = ClientConfig::builder().read_timeout(TIMEOUT).build();
    let mut client = Client::connect(addr, config).unwrap();

    assert!(matches!(client.send("hello"), Err(KvError::Io(_))));
}
