//! Connection Handler
//!
//! Handles individual client connections.

use std::io::ErrorKind;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;

use crate::dispatcher::Dispatcher;
use crate::error::{KvError, Result};
use crate::protocol::{read_frame, write_response, Response};

/// Handles a single client connection
///
/// The protocol carries one request per connection: the server reads until
/// the length prefixes say the request is complete (or the client
/// half-closes), answers and closes.
pub struct Connection {
    /// TCP stream, used for both directions
    stream: TcpStream,

    /// Shared request router
    dispatcher: Arc<Dispatcher>,

    /// Hard cap on request bytes
    max_request_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>, max_request_size: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Accepted sockets may inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            dispatcher,
            max_request_size,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until the response is sent)
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut buf = BytesMut::new();
        let response = match read_frame(&mut self.stream, &mut buf, self.max_request_size) {
            Ok(()) => self.dispatcher.handle(&buf),
            Err(KvError::Protocol(e)) => {
                tracing::warn!("Rejecting request from {}: {}", self.peer_addr, e);
                Dispatcher::reject(e)
            }
            Err(KvError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                // Frame never completed; answer whatever arrived
                if buf.is_empty() {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                tracing::debug!(
                    "Read timeout for client {}, handling {} buffered bytes",
                    self.peer_addr,
                    buf.len()
                );
                self.dispatcher.handle(&buf)
            }
            Err(KvError::Io(ref e))
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                ) =>
            {
                tracing::debug!("Connection closed by client {}", self.peer_addr);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        if let Err(e) = self.send_response(&response) {
            // Client went away before the answer; not a server error
            if let KvError::Io(ref io_err) = e {
                match io_err.kind() {
                    ErrorKind::ConnectionAborted
                    | ErrorKind::ConnectionReset
                    | ErrorKind::BrokenPipe => {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                    _ => {}
                }
            }
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            return Err(e);
        }

        // Closing signals the end of the response
        let _ = self.stream.shutdown(Shutdown::Both);
        Ok(())
    }

    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.stream, response)
    }
}
