//! # kvstr
//!
//! A minimal networked key-value store with:
//! - A length-prefixed text protocol (GET/PUT/DEL) that frames keys and
//!   values containing any byte, spaces and colons included
//! - An in-memory slot table with tombstone reuse and capacity doubling
//! - One request per TCP connection, store access serialized by one lock
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (accept loop, one thread per connection)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ raw request bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │          (decode request / encode response)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Dispatcher                                │
//! │                 (Mutex<Option<Store>>)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │    Store    │
//!                │ (slot table)│
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod dispatcher;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, ParseError, Result, StoreError};
pub use config::{Config, LogLevel};
pub use dispatcher::Dispatcher;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvstr
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
