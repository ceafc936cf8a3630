//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────┬───┬───────────┬───┬─────────┬───┬─────────────┬───┬───────────┐
//! │  OP  │ ␠ │ key_len   │ : │   key   │ ␠ │ value_len   │ : │   value   │
//! └──────┴───┴───────────┴───┴─────────┴───┴─────────────┴───┴───────────┘
//!                                          └──────────── PUT only ────────┘
//! ```
//! Lengths are decimal ASCII byte counts and must be greater than zero.
//! After the last span the input must end; nothing may follow.
//!
//! ### Response Format
//! ```text
//! ┌────────────┬───┬──────────────────────┐
//! │ Status (3) │ ␠ │        Body          │
//! └────────────┴───┴──────────────────────┘
//! ```

use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;

use crate::error::{KvError, ParseError, Result};
use super::{Operation, Request, Response, Status};

/// Maximum response size accepted by `read_response` (16 MB)
pub const MAX_RESPONSE_SIZE: u64 = 16 * 1024 * 1024;

/// Bytes pulled from a stream per read call
const READ_CHUNK_SIZE: usize = 8 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: `OP len:key` or `PUT len:key len:value`
pub fn encode_request(request: &Request) -> Vec<u8> {
    let op = request.operation().as_str();
    let key = request.key();
    let value_len = request.value().map_or(0, <[u8]>::len);

    // Room for the separators and both decimal length prefixes
    let mut message = Vec::with_capacity(op.len() + key.len() + value_len + 48);
    message.extend_from_slice(op.as_bytes());
    message.push(b' ');
    push_span(&mut message, key);

    if let Some(value) = request.value() {
        message.push(b' ');
        push_span(&mut message, value);
    }

    message
}

/// Append `<len>:<bytes>`
fn push_span(message: &mut Vec<u8>, span: &[u8]) {
    message.extend_from_slice(span.len().to_string().as_bytes());
    message.push(b':');
    message.extend_from_slice(span);
}

/// Decode a request from a complete message
///
/// The whole input must be exactly one request.
pub fn decode_request(bytes: &[u8]) -> std::result::Result<Request, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::InvalidInput);
    }

    // Operation token runs up to the first space
    let space = bytes
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ParseError::InvalidOperation)?;
    let operation =
        Operation::from_token(&bytes[..space]).ok_or(ParseError::InvalidOperation)?;

    let mut cursor = space + 1;
    let key = read_span(bytes, &mut cursor).ok_or(ParseError::InvalidKey)?;

    let request = match operation {
        Operation::Get => Request::Get { key: key.to_vec() },
        Operation::Del => Request::Del { key: key.to_vec() },
        Operation::Put => {
            if bytes.get(cursor) != Some(&b' ') {
                return Err(ParseError::InvalidValue);
            }
            cursor += 1;
            let value = read_span(bytes, &mut cursor).ok_or(ParseError::InvalidValue)?;
            Request::Put {
                key: key.to_vec(),
                value: value.to_vec(),
            }
        }
    };

    if cursor != bytes.len() {
        return Err(ParseError::TrailingData);
    }

    Ok(request)
}

/// Read one `<len>:<bytes>` span starting at `cursor`
///
/// On success the cursor is left just past the span.
fn read_span<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<&'a [u8]> {
    match scan_span(bytes, *cursor) {
        SpanScan::Complete { start, end } => {
            let span = bytes.get(start..end)?;
            *cursor = end;
            Some(span)
        }
        SpanScan::Partial | SpanScan::Invalid => None,
    }
}

/// Outcome of looking for a span in a possibly unfinished buffer
enum SpanScan {
    /// The whole span is present at `start..end`
    Complete { start: usize, end: usize },
    /// More bytes could still complete the span
    Partial,
    /// No amount of further input makes this a valid span
    Invalid,
}

fn scan_span(bytes: &[u8], cursor: usize) -> SpanScan {
    let rest = match bytes.get(cursor..) {
        Some(rest) => rest,
        None => return SpanScan::Partial,
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    match rest.get(digits) {
        None => return SpanScan::Partial,
        Some(b':') if digits > 0 => {}
        Some(_) => return SpanScan::Invalid,
    }

    // Digits are ASCII, so this only fails on overflow
    let len = std::str::from_utf8(&rest[..digits])
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok());
    let len = match len {
        Some(len) if len > 0 => len,
        _ => return SpanScan::Invalid,
    };

    let start = cursor + digits + 1;
    match start.checked_add(len) {
        Some(end) if end <= bytes.len() => SpanScan::Complete { start, end },
        Some(_) => SpanScan::Partial,
        None => SpanScan::Invalid,
    }
}

/// Whether `bytes` already holds everything needed to answer a request
///
/// True once the operation, the key span and (for PUT) the value span have
/// all arrived, or as soon as the prefix can no longer become a valid
/// request. Anything buffered past the frame is left for `decode_request`
/// to reject as trailing data.
pub fn request_complete(bytes: &[u8]) -> bool {
    let space = match bytes.iter().position(|&b| b == b' ') {
        Some(space) => space,
        // Still waiting on the operation token, unless it is already wrong
        None => {
            return ![Operation::Get, Operation::Put, Operation::Del]
                .iter()
                .any(|op| op.as_str().as_bytes().starts_with(bytes))
        }
    };

    let operation = match Operation::from_token(&bytes[..space]) {
        Some(operation) => operation,
        None => return true,
    };

    let key_end = match scan_span(bytes, space + 1) {
        SpanScan::Complete { end, .. } => end,
        SpanScan::Partial => return false,
        SpanScan::Invalid => return true,
    };

    if operation != Operation::Put {
        return true;
    }

    match bytes.get(key_end) {
        None => false,
        Some(b' ') => !matches!(scan_span(bytes, key_end + 1), SpanScan::Partial),
        Some(_) => true,
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: `<code> <body>`, or just `<code>` when the body is empty
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut message = Vec::with_capacity(4 + response.body.len());
    message.extend_from_slice(response.status.code().to_string().as_bytes());

    if !response.body.is_empty() {
        message.push(b' ');
        message.extend_from_slice(&response.body);
    }

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(KvError::Network(format!(
            "Malformed response: expected a 3-digit status, got {} bytes",
            bytes.len()
        )));
    }

    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
    let status = Status::from_code(code).ok_or_else(|| {
        KvError::Network(format!("Unknown response status: {}", code))
    })?;

    let body = match bytes.get(3) {
        None => Vec::new(),
        Some(b' ') => bytes[4..].to_vec(),
        Some(_) => {
            return Err(KvError::Network(
                "Malformed response: missing space after status".to_string(),
            ))
        }
    };

    Ok(Response { status, body })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one request frame into `buf`
///
/// Stops as soon as `request_complete` holds for the buffer, or at
/// end-of-stream. Bytes received before an error stay in `buf`. Fails with
/// `ParseError::TooLarge` once more than `max_size` bytes arrive.
pub fn read_frame<R: Read>(reader: &mut R, buf: &mut BytesMut, max_size: usize) -> Result<()> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if buf.len() + n > max_size {
            return Err(ParseError::TooLarge.into());
        }
        buf.extend_from_slice(&chunk[..n]);

        if request_complete(&buf[..]) {
            return Ok(());
        }
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
///
/// Blocks until the server closes the connection.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let mut bytes = Vec::new();
    reader.take(MAX_RESPONSE_SIZE).read_to_end(&mut bytes)?;
    decode_response(&bytes)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
