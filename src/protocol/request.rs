//! Request definitions
//!
//! Represents requests from clients.

use std::fmt;

/// Operation token on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Put,
    Del,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Put => "PUT",
            Operation::Del => "DEL",
        }
    }

    /// Match an exact, case-sensitive operation token
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"GET" => Some(Operation::Get),
            b"PUT" => Some(Operation::Put),
            b"DEL" => Some(Operation::Del),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Del { key: Vec<u8> },
}

impl Request {
    /// Get the operation
    pub fn operation(&self) -> Operation {
        match self {
            Request::Get { .. } => Operation::Get,
            Request::Put { .. } => Operation::Put,
            Request::Del { .. } => Operation::Del,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Request::Get { key } | Request::Put { key, .. } | Request::Del { key } => key,
        }
    }

    /// The value span, present only for PUT
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Request::Put { value, .. } => Some(value.as_slice()),
            _ => None,
        }
    }
}
