//! Network Module
//!
//! TCP server, connection handling and the client side.
//!
//! ## Architecture
//! - Single acceptor thread, polling a non-blocking listener
//! - One thread per accepted connection, one request per connection
//! - Requests routed through the shared `Dispatcher`
//! - Cooperative shutdown through a `ShutdownToken`

mod server;
mod connection;
mod shutdown;
pub mod client;

pub use server::Server;
pub use connection::Connection;
pub use shutdown::ShutdownToken;
