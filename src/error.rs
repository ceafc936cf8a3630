//! Error types for kvstr
//!
//! Provides a unified error type plus the narrower protocol and store
//! errors that are surfaced to clients as status lines.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvstr operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(#[from] ParseError),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons a request could not be decoded
///
/// Every variant is reported to the client as `400 Bad Request: <reason>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty message
    #[error("invalid input")]
    InvalidInput,

    /// Missing operation token or not one of GET/PUT/DEL
    #[error("malformed operation")]
    InvalidOperation,

    /// Bad key length prefix or key span
    #[error("malformed key")]
    InvalidKey,

    /// Bad separator, length prefix or span for a PUT value
    #[error("malformed value")]
    InvalidValue,

    /// Bytes left over after a complete request
    #[error("junk data after request")]
    TrailingData,

    /// Request exceeded the configured size cap
    #[error("request too large")]
    TooLarge,
}

impl ParseError {
    /// Text used after `400 Bad Request: `
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidInput => "invalid input",
            ParseError::InvalidOperation => "malformed operation",
            ParseError::InvalidKey => "malformed key",
            ParseError::InvalidValue => "malformed value",
            ParseError::TrailingData => "junk data after request",
            ParseError::TooLarge => "request too large",
        }
    }
}

/// Errors returned by the in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Empty key or value, or a zero initial capacity
    #[error("invalid argument")]
    InvalidArgument,

    /// The entry table could not grow
    #[error("out of memory")]
    OutOfMemory,

    /// Key not present
    #[error("key not found")]
    NotFound,
}
