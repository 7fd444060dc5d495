//! TCP Client
//!
//! Sends requests to a memkv server over one connection, one request and
//! one response at a time.

use std::io::{self, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::protocol::{read_response, write_request};

/// Client side of a single connection
pub struct Client {
    stream: TcpStream,
    /// Response buffer; a response that fills it is rejected
    buffer: Vec<u8>,
    peer_addr: SocketAddr,
}

impl Client {
    /// Connect to `addr`, honouring the configured dial timeout
    pub fn connect(addr: impl ToSocketAddrs, config: ClientConfig) -> Result<Self> {
        let stream = match config.dial_timeout.filter(|d| !d.is_zero()) {
            Some(timeout) => connect_timeout(addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout.filter(|d| !d.is_zero()))?;
        stream.set_write_timeout(config.write_timeout.filter(|d| !d.is_zero()))?;

        let peer_addr = stream.peer_addr()?;

        Ok(Self {
            stream,
            buffer: vec![0u8; config.read_buffer_size],
            peer_addr,
        })
    }

    /// Send one request and wait for its response
    ///
    /// The request goes out in one write; the response is whatever one
    /// read returns. `KvError::ResponseTooLarge` if it filled the buffer.
    pub fn send(&mut self, request: &str) -> Result<String> {
        write_request(&mut self.stream, request)?;
        read_response(&mut self.stream, &mut self.buffer)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Try every resolved address in turn, each bounded by `timeout`
fn connect_timeout(addr: impl ToSocketAddrs, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;

    for addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}
