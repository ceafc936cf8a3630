//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

use crate::error::{ParseError, StoreError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    NotFound = 404,
    InternalError = 500,
}

impl Status {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Status::Ok),
            201 => Some(Status::Created),
            400 => Some(Status::BadRequest),
            404 => Some(Status::NotFound),
            500 => Some(Status::InternalError),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Text after the code (value for a successful GET)
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: Status, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `200 <value>`
    pub fn value(value: &[u8]) -> Self {
        Self::new(Status::Ok, value)
    }

    /// `201 Created: Key stored successfully.`
    pub fn created() -> Self {
        Self::new(Status::Created, "Created: Key stored successfully.")
    }

    /// `200 Key deleted`
    pub fn deleted() -> Self {
        Self::new(Status::Ok, "Key deleted")
    }

    /// `404 Not Found`
    pub fn not_found() -> Self {
        Self::new(Status::NotFound, "Not Found")
    }

    /// `400 Bad Request: No key`
    pub fn no_key() -> Self {
        Self::bad_request("No key")
    }

    /// `400 Bad Request: Key and value must not be empty.`
    pub fn empty_put() -> Self {
        Self::bad_request("Key and value must not be empty.")
    }

    /// `400 Bad Request: <reason>` for a request that failed to decode
    pub fn parse_error(error: ParseError) -> Self {
        Self::bad_request(error.reason())
    }

    pub fn bad_request(reason: &str) -> Self {
        Self::new(Status::BadRequest, format!("Bad Request: {}", reason))
    }

    /// `500 Internal Server Error: Failed to store key: <key>, reason: <error>`
    pub fn store_failed(key: &[u8], error: StoreError) -> Self {
        let mut body = b"Internal Server Error: Failed to store key: ".to_vec();
        body.extend_from_slice(key);
        body.extend_from_slice(format!(", reason: {}", error).as_bytes());
        Self::new(Status::InternalError, body)
    }

    pub fn internal_error(reason: &str) -> Self {
        Self::new(
            Status::InternalError,
            format!("Internal Server Error: {}", reason),
        )
    }

    /// Body as text, lossy for non-UTF-8 values
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
