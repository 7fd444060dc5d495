//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufWriter, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::{KvError, Result};
use crate::protocol::{read_request, write_response};

use super::{CancellationToken, Handler};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader; unbuffered, one read is one request
    reader: TcpStream,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Turns a request into a response
    handler: Arc<dyn Handler>,

    /// Server-wide shutdown signal
    cancel: CancellationToken,

    /// Request buffer sized to the max message size
    buffer: Vec<u8>,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up the request buffer, buffered writes and timeouts
    pub fn new(
        stream: TcpStream,
        handler: Arc<dyn Handler>,
        cancel: CancellationToken,
        config: &ServerConfig,
    ) -> Result<Self> {
        // Accepted sockets may inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut connection = Self {
            reader: read_stream,
            writer: BufWriter::new(write_stream),
            handler,
            cancel,
            buffer: vec![0u8; config.max_message_size],
        };
        connection.set_timeouts(config.idle_timeout, config.write_timeout)?;

        Ok(connection)
    }

    /// Configure connection timeouts
    ///
    /// `None` (or a zero duration) leaves the direction without a deadline.
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        let read = read.filter(|d| !d.is_zero());
        let write = write.filter(|d| !d.is_zero());

        self.reader.set_read_timeout(read)?;
        self.writer.get_ref().set_write_timeout(write)?;

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends responses. Shutdown is checked
    /// between read, dispatch and write; a blocked read is only unblocked by
    /// its idle deadline or by the client. Returns when the client
    /// disconnects, the server shuts down, or a transport error occurs.
    pub fn handle(&mut self) -> Result<()> {
        loop {
            if self.cancelled() {
                return Ok(());
            }

            // Read next request
            let request = match read_request(&mut self.reader, &mut self.buffer) {
                Ok(Some(request)) => request,
                Ok(None) => {
                    tracing::debug!("Client closed the connection");
                    return Ok(());
                }
                Err(e @ KvError::MessageTooLarge { .. }) => {
                    tracing::warn!(limit = self.buffer.len(), "max message size reached");
                    return Err(e);
                }
                Err(KvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::warn!(error = %e, "Connection dropped by client");
                    return Ok(());
                }
                Err(KvError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::warn!("Idle timeout reached, closing connection");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read data");
                    return Err(e);
                }
            };

            tracing::trace!(request = %request, "Received request");

            if self.cancelled() {
                return Ok(());
            }

            let response = self.handler.handle(&self.cancel, &request);

            if self.cancelled() {
                return Ok(());
            }

            // Send response
            if let Err(e) = write_response(&mut self.writer, &response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::warn!(error = %e, "Client disconnected before response could be sent");
                        return Ok(());
                    }
                }
                tracing::error!(error = %e, "failed to write data");
                return Err(e);
            }
        }
    }

    /// Close both directions of the socket
    pub fn close(self) {
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            // Already gone if the peer reset the connection
            if e.kind() != ErrorKind::NotConnected {
                tracing::error!(error = %e, "failed to close connection");
            }
        }
    }

    fn cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            tracing::debug!("Server shutting down, closing connection");
        }
        cancelled
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}

/// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
