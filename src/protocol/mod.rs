//! Protocol Module
//!
//! Defines the text wire protocol for client-server communication.
//!
//! ## Protocol Format
//!
//! Keys and values are framed by their decimal byte length, so they may
//! contain spaces, colons or any other byte.
//!
//! ### Request Format
//! ```text
//! GET <len>:<key>
//! DEL <len>:<key>
//! PUT <len>:<key> <len>:<value>
//! ```
//!
//! ### Response Format
//! ```text
//! <3-digit-code> <text>
//! ```
//! Not newline-terminated; the server closes the connection after writing.
//!
//! ### Status Codes
//! - 200: OK (value, or deletion confirmation)
//! - 201: Created
//! - 400: Bad Request (with reason)
//! - 404: Not Found
//! - 500: Internal Server Error (with reason)

mod request;
mod response;
mod codec;

pub use request::{Operation, Request};
pub use response::{Response, Status};
pub use codec::{
    encode_request, decode_request, encode_response, decode_response,
    request_complete, read_frame, write_request, read_response, write_response,
    MAX_RESPONSE_SIZE,
};
