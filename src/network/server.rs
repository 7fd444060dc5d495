//! TCP Server
//!
//! Accepts connections and serves each one on its own thread.
//!
//! ## Lifecycle
//! ```text
//! Created ──serve()──▶ Listening ──shutdown()──▶ ShuttingDown ──drained──▶ Stopped
//! ```

use std::any::Any;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ServerConfig;
use crate::error::{KvError, Result};

use super::connection::Connection;
use super::limiter::{ConnectionLimiter, Permit};
use super::shutdown::{CancellationToken, TaskGuard, TaskTracker};

/// Turns one request into one response
///
/// Closures with the same signature are handlers too, which lets tests
/// swap the query handler for an echo.
pub trait Handler: Send + Sync {
    fn handle(&self, cancel: &CancellationToken, request: &str) -> String;
}

impl<F> Handler for F
where
    F: Fn(&CancellationToken, &str) -> String + Send + Sync,
{
    fn handle(&self, cancel: &CancellationToken, request: &str) -> String {
        self(cancel, request)
    }
}

/// Server lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Socket bound, not yet accepting
    Created,
    /// Accept loop running
    Listening,
    /// No new accepts, waiting for connections to drain
    ShuttingDown,
    /// Every connection finished
    Stopped,
}

/// TCP server for memkv
///
/// ## Concurrency:
/// - One thread runs the accept loop (the caller of `serve`)
/// - One thread per active connection, bounded by `limiter`
/// - `tracker` counts the accept loop and every connection thread
pub struct Server {
    config: ServerConfig,

    /// Address the listener is bound to
    local_addr: SocketAddr,

    /// Taken by `serve` (or dropped by an early `shutdown`)
    listener: Mutex<Option<TcpListener>>,

    /// Admission gate sized to `max_connections`
    limiter: Arc<ConnectionLimiter>,

    /// Running accept loop and connection threads
    tracker: Arc<TaskTracker>,

    /// Broadcast to every task on shutdown
    cancel: CancellationToken,

    state: Mutex<ServerState>,

    /// Used to name connection threads
    next_connection_id: AtomicU64,
}

impl Server {
    /// Bind the listening socket
    ///
    /// A bind failure is returned to the caller; nothing is retried.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(KvError::Config("max_connections must be at least 1".to_string()));
        }
        if config.max_message_size == 0 {
            return Err(KvError::Config("max_message_size must be at least 1".to_string()));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            tracker: Arc::new(TaskTracker::new()),
            cancel: CancellationToken::new(),
            listener: Mutex::new(Some(listener)),
            state: Mutex::new(ServerState::Created),
            next_connection_id: AtomicU64::new(1),
            local_addr,
            config,
        })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        *self.state.lock()
    }

    /// Connections currently holding an admission slot
    pub fn active_connections(&self) -> usize {
        self.limiter.in_use()
    }

    /// Run the accept loop on the calling thread (blocking)
    ///
    /// Returns once shutdown has been signalled. Connections accepted
    /// before that keep running; `shutdown` waits for them.
    pub fn serve(&self, handler: Arc<dyn Handler>) -> Result<()> {
        let (listener, _accept_guard) = {
            let mut state = self.state.lock();
            match *state {
                ServerState::Created => {}
                ServerState::Listening => {
                    return Err(KvError::Config("server is already serving".to_string()));
                }
                ServerState::ShuttingDown | ServerState::Stopped => return Ok(()),
            }

            let Some(listener) = self.listener.lock().take() else {
                return Ok(());
            };
            *state = ServerState::Listening;
            // Registered under the state lock so shutdown cannot miss it
            (listener, self.tracker.track())
        };

        tracing::info!(addr = %self.local_addr, "Listening for connections");
        self.accept_loop(&listener, &handler);
        drop(listener);
        tracing::info!(addr = %self.local_addr, "Stopped accepting connections");

        Ok(())
    }

    fn accept_loop(&self, listener: &TcpListener, handler: &Arc<dyn Handler>) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }

            let (stream, peer_addr) = match listener.accept() {
                Ok(conn) => conn,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if self.cancel.wait_timeout(self.config.accept_poll_interval) {
                        return;
                    }
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                    if self.cancel.wait_timeout(self.config.accept_poll_interval) {
                        return;
                    }
                    continue;
                }
            };

            // Blocks while at capacity: backpressure lands on the listen queue
            let Some(permit) = self.limiter.acquire(&self.cancel) else {
                tracing::debug!(client_address = %peer_addr, "Shutdown while waiting for a connection slot");
                return;
            };

            self.spawn_connection(stream, peer_addr, permit, Arc::clone(handler));
        }
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
        permit: Permit,
        handler: Arc<dyn Handler>,
    ) {
        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let guard = self.tracker.track();
        let cancel = self.cancel.clone();
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("memkv-conn-{id}"))
            .spawn(move || serve_connection(stream, peer_addr, handler, cancel, &config, permit, guard));

        // The closure (and with it the socket, permit and guard) is dropped on failure
        if let Err(e) = spawned {
            tracing::error!(client_address = %peer_addr, error = %e, "failed to spawn connection thread");
        }
    }

    /// Stop accepting, signal every connection and wait for them to drain
    ///
    /// Safe to call more than once. Returns `KvError::ShutdownTimeout` if
    /// connections are still running after `deadline`; they are not killed.
    pub fn shutdown(&self, deadline: Duration) -> Result<()> {
        {
            let mut state = self.state.lock();
            match *state {
                ServerState::Stopped => return Ok(()),
                ServerState::ShuttingDown => {}
                ServerState::Created | ServerState::Listening => {
                    tracing::info!("Shutting down server");
                    *state = ServerState::ShuttingDown;
                }
            }
        }

        // Release a listener that was never served
        self.listener.lock().take();
        self.cancel.cancel();

        if !self.tracker.wait_idle(deadline) {
            tracing::warn!(
                active = self.tracker.running(),
                "shutdown deadline exceeded with connections still running"
            );
            return Err(KvError::ShutdownTimeout);
        }

        *self.state.lock() = ServerState::Stopped;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Body of a connection thread
///
/// The socket is closed and the permit and guard released on every path,
/// panics included.
fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<dyn Handler>,
    cancel: CancellationToken,
    config: &ServerConfig,
    _permit: Permit,
    _guard: TaskGuard,
) {
    let span = tracing::info_span!("connection", client_address = %peer_addr);
    let _enter = span.enter();

    let mut connection = match Connection::new(stream, handler, cancel, config) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!(error = %e, "failed to set up connection");
            return;
        }
    };

    tracing::info!("Connected client");

    match panic::catch_unwind(AssertUnwindSafe(|| connection.handle())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(error = %e, "Connection ended with error"),
        Err(payload) => tracing::error!(panic = %panic_message(payload.as_ref()), "caught panic"),
    }

    connection.close();
    tracing::info!("Disconnected client");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
