//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{KvError, Result};
use super::{Connection, ShutdownToken};

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for kvstr
///
/// Owns everything the process shares between connections: the dispatcher
/// (and through it the store), the listening socket and the shutdown token.
pub struct Server {
    config: Config,

    /// Shared request router
    dispatcher: Arc<Dispatcher>,

    /// Listening socket; taken by `run`, or dropped by `teardown`
    listener: Mutex<Option<TcpListener>>,

    /// Bound address (resolved when binding to port 0)
    local_addr: SocketAddr,

    shutdown: ShutdownToken,

    /// Connections currently being served
    active_connections: Arc<AtomicUsize>,

    /// Set by the first `teardown`
    torn_down: AtomicBool,
}

impl Server {
    /// Create the store and bind the listening socket
    ///
    /// Failing to bind is fatal to startup; the caller should exit.
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "Initializing key value store with initial capacity of {}",
            config.initial_capacity
        );
        let dispatcher = Arc::new(Dispatcher::new(config.initial_capacity)?);

        let listener = TcpListener::bind(config.listen_addr.as_str())?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            dispatcher,
            listener: Mutex::new(Some(listener)),
            local_addr,
            shutdown: ShutdownToken::new(),
            active_connections: Arc::new(AtomicUsize::new(0)),
            torn_down: AtomicBool::new(false),
        })
    }

    /// Run the accept loop (blocking)
    ///
    /// Returns once the shutdown token is cancelled, after tearing down.
    pub fn run(&self) -> Result<()> {
        let listener = self
            .listener
            .lock()
            .take()
            .ok_or_else(|| KvError::Network("listener already closed".to_string()))?;

        while !self.shutdown.is_cancelled() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("Accepted connection from {}", addr);
                    self.spawn_connection(stream, addr);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    tracing::info!("Received interrupt signal. Stopping new connections.");
                    self.shutdown.cancel();
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        drop(listener);
        self.teardown();
        Ok(())
    }

    /// Serve one connection on its own thread
    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let active = self.active_connections.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!(
                "Connection limit ({}) reached, dropping connection from {}",
                self.config.max_connections,
                addr
            );
            return;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let active_connections = Arc::clone(&self.active_connections);
        let max_request_size = self.config.max_request_size;
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("kvstr-conn-{}", addr))
            .spawn(move || {
                let _slot = ConnectionSlot(active_connections);

                let result = Connection::new(stream, dispatcher, max_request_size).and_then(
                    |mut connection| {
                        connection.set_timeouts(read_timeout_ms, write_timeout_ms)?;
                        connection.handle()
                    },
                );
                if let Err(e) = result {
                    tracing::warn!("Connection from {} failed: {}", addr, e);
                }
            });

        if let Err(e) = spawned {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::error!("Failed to spawn handler for {}: {}", addr, e);
        }
    }

    /// Signal the accept loop to stop
    pub fn shutdown(&self) {
        tracing::info!("Initiating server shutdown");
        self.shutdown.cancel();
    }

    /// Release the listener and the store
    ///
    /// Only the first call does anything; returns whether it was this one.
    pub fn teardown(&self) -> bool {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return false;
        }

        self.shutdown.cancel();
        drop(self.listener.lock().take());
        self.dispatcher.close();

        tracing::info!("Graceful clean up done.");
        true
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token that stops `run` when cancelled (e.g. from a signal handler)
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Releases a connection slot when the handler thread ends
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
