//! Codec Tests
//!
//! Tests for request and response encoding/decoding.

use std::io::Cursor;

use bytes::BytesMut;
use kvstr::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_frame,
    read_response, request_complete, write_request, write_response, Operation, Request,
    Response, Status,
};
use kvstr::{KvError, ParseError};

// =============================================================================
// Request Decoding Tests
// =============================================================================

#[test]
fn test_decode_get() {
    let request = decode_request(b"GET 3:key").unwrap();

    assert_eq!(request.operation(), Operation::Get);
    assert_eq!(request.key(), b"key");
    assert_eq!(request.value(), None);
}

#[test]
fn test_decode_put() {
    let request = decode_request(b"PUT 3:key 5:value").unwrap();

    assert_eq!(request.operation(), Operation::Put);
    assert_eq!(request.key(), b"key");
    assert_eq!(request.value(), Some(&b"value"[..]));
}

#[test]
fn test_decode_del() {
    let request = decode_request(b"DEL 3:key").unwrap();

    assert_eq!(
        request,
        Request::Del {
            key: b"key".to_vec()
        }
    );
}

#[test]
fn test_decode_spans_with_spaces_and_colons() {
    let request = decode_request(b"PUT 7:a b:c d 11:x:y z 1:2 3").unwrap();

    assert_eq!(
        request,
        Request::Put {
            key: b"a b:c d".to_vec(),
            value: b"x:y z 1:2 3".to_vec(),
        }
    );
}

#[test]
fn test_decode_multi_digit_length() {
    let key = "k".repeat(12);
    let message = format!("GET 12:{}", key);

    let request = decode_request(message.as_bytes()).unwrap();
    assert_eq!(request.key(), key.as_bytes());
}

#[test]
fn test_decode_binary_key() {
    let mut message = b"GET 4:".to_vec();
    message.extend_from_slice(&[0x00, 0xFF, b' ', b':']);

    let request = decode_request(&message).unwrap();
    assert_eq!(request.key(), &[0x00, 0xFF, b' ', b':']);
}

// =============================================================================
// Request Decoding Error Tests
// =============================================================================

#[test]
fn test_empty_input() {
    assert_eq!(decode_request(b""), Err(ParseError::InvalidInput));
}

#[test]
fn test_missing_space_after_operation() {
    assert_eq!(decode_request(b"GET"), Err(ParseError::InvalidOperation));
    assert_eq!(decode_request(b"GET3:key"), Err(ParseError::InvalidOperation));
}

#[test]
fn test_unknown_operation() {
    assert_eq!(decode_request(b"SET 3:key"), Err(ParseError::InvalidOperation));
    assert_eq!(decode_request(b"GETX 3:key"), Err(ParseError::InvalidOperation));
    assert_eq!(decode_request(b" 3:key"), Err(ParseError::InvalidOperation));
}

#[test]
fn test_operation_is_case_sensitive() {
    assert_eq!(decode_request(b"get 3:key"), Err(ParseError::InvalidOperation));
}

#[test]
fn test_zero_key_length() {
    assert_eq!(decode_request(b"GET 0:key"), Err(ParseError::InvalidKey));
}

#[test]
fn test_key_length_overrun() {
    assert_eq!(decode_request(b"GET 5:key"), Err(ParseError::InvalidKey));
}

#[test]
fn test_key_missing_colon() {
    assert_eq!(decode_request(b"GET 3key"), Err(ParseError::InvalidKey));
    assert_eq!(decode_request(b"GET key"), Err(ParseError::InvalidKey));
    assert_eq!(decode_request(b"GET "), Err(ParseError::InvalidKey));
}

#[test]
fn test_key_length_not_a_number() {
    assert_eq!(decode_request(b"GET -3:key"), Err(ParseError::InvalidKey));
    assert_eq!(decode_request(b"GET x:key"), Err(ParseError::InvalidKey));
    assert_eq!(decode_request(b"GET 3 :key"), Err(ParseError::InvalidKey));
}

#[test]
fn test_key_length_overflow() {
    assert_eq!(
        decode_request(b"GET 99999999999999999999999:key"),
        Err(ParseError::InvalidKey)
    );
}

#[test]
fn test_put_missing_value() {
    assert_eq!(decode_request(b"PUT 3:key"), Err(ParseError::InvalidValue));
}

#[test]
fn test_put_value_without_separator() {
    assert_eq!(decode_request(b"PUT 3:key5:value"), Err(ParseError::InvalidValue));
}

#[test]
fn test_put_zero_value_length() {
    assert_eq!(decode_request(b"PUT 3:key 0:value"), Err(ParseError::InvalidValue));
}

#[test]
fn test_put_value_length_overrun() {
    assert_eq!(decode_request(b"PUT 3:key 9:value"), Err(ParseError::InvalidValue));
}

#[test]
fn test_put_bad_key_reported_before_value() {
    assert_eq!(decode_request(b"PUT 0:key 5:value"), Err(ParseError::InvalidKey));
}

#[test]
fn test_trailing_data_after_put() {
    assert_eq!(
        decode_request(b"PUT 3:key 5:value EXTRA"),
        Err(ParseError::TrailingData)
    );
}

#[test]
fn test_trailing_data_after_del() {
    assert_eq!(decode_request(b"DEL 3:key EXTRA"), Err(ParseError::TrailingData));
}

#[test]
fn test_trailing_data_short_key_length() {
    // Declared length shorter than the actual key is not silently truncated
    assert_eq!(decode_request(b"GET 2:key"), Err(ParseError::TrailingData));
}

#[test]
fn test_trailing_newline_rejected() {
    assert_eq!(decode_request(b"GET 3:key\n"), Err(ParseError::TrailingData));
}

#[test]
fn test_concatenated_requests_rejected() {
    assert_eq!(
        decode_request(b"GET 3:keyGET 3:key"),
        Err(ParseError::TrailingData)
    );
}

#[test]
fn test_parse_error_reasons() {
    assert_eq!(ParseError::InvalidInput.reason(), "invalid input");
    assert_eq!(ParseError::InvalidOperation.reason(), "malformed operation");
    assert_eq!(ParseError::InvalidKey.reason(), "malformed key");
    assert_eq!(ParseError::InvalidValue.reason(), "malformed value");
    assert_eq!(ParseError::TrailingData.reason(), "junk data after request");
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_wire_format_get() {
    let request = Request::Get {
        key: b"key".to_vec(),
    };
    assert_eq!(encode_request(&request), b"GET 3:key");
}

#[test]
fn test_wire_format_put() {
    let request = Request::Put {
        key: b"key".to_vec(),
        value: b"value".to_vec(),
    };
    assert_eq!(encode_request(&request), b"PUT 3:key 5:value");
}

#[test]
fn test_wire_format_del() {
    let request = Request::Del {
        key: b"key".to_vec(),
    };
    assert_eq!(encode_request(&request), b"DEL 3:key");
}

#[test]
fn test_length_counts_bytes_not_characters() {
    let request = Request::Get {
        key: "ключ".as_bytes().to_vec(),
    };
    let encoded = encode_request(&request);

    assert!(encoded.starts_with(b"GET 8:"));
    assert_eq!(decode_request(&encoded).unwrap(), request);
}

#[test]
fn test_encode_decode_put_with_awkward_bytes() {
    let key = b"key with spaces: and 12:colons".to_vec();
    let value: Vec<u8> = (1..=255).collect();

    let request = Request::Put {
        key: key.clone(),
        value: value.clone(),
    };
    let decoded = decode_request(&encode_request(&request)).unwrap();

    match decoded {
        Request::Put { key: k, value: v } => {
            assert_eq!(k, key);
            assert_eq!(v, value);
        }
        _ => panic!("Expected PUT request"),
    }
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_wire_format_responses() {
    assert_eq!(encode_response(&Response::value(b"hello")), b"200 hello");
    assert_eq!(
        encode_response(&Response::created()),
        b"201 Created: Key stored successfully."
    );
    assert_eq!(encode_response(&Response::deleted()), b"200 Key deleted");
    assert_eq!(encode_response(&Response::not_found()), b"404 Not Found");
    assert_eq!(encode_response(&Response::no_key()), b"400 Bad Request: No key");
    assert_eq!(
        encode_response(&Response::parse_error(ParseError::InvalidKey)),
        b"400 Bad Request: malformed key"
    );
}

#[test]
fn test_decode_response() {
    let response = decode_response(b"200 some value with spaces").unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body, b"some value with spaces");
}

#[test]
fn test_decode_response_without_body() {
    let response = decode_response(b"404").unwrap();

    assert_eq!(response.status, Status::NotFound);
    assert!(response.body.is_empty());
}

#[test]
fn test_decode_response_errors() {
    assert!(matches!(decode_response(b""), Err(KvError::Network(_))));
    assert!(matches!(decode_response(b"2x0 ok"), Err(KvError::Network(_))));
    assert!(matches!(decode_response(b"299 ok"), Err(KvError::Network(_))));
    assert!(matches!(decode_response(b"200ok"), Err(KvError::Network(_))));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

fn read_request(cursor: &mut Cursor<Vec<u8>>, max_size: usize) -> kvstr::Result<Request> {
    let mut buf = BytesMut::new();
    read_frame(cursor, &mut buf, max_size)?;
    Ok(decode_request(&buf)?)
}

#[test]
fn test_stream_write_read_request() {
    let request = Request::Put {
        key: b"key".to_vec(),
        value: b"value".to_vec(),
    };

    let mut buffer = Vec::new();
    write_request(&mut buffer, &request).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_request(&mut cursor, 1024).unwrap(), request);
}

#[test]
fn test_stream_read_request_too_large() {
    let request = Request::Put {
        key: b"key".to_vec(),
        value: vec![b'v'; 64],
    };

    let mut buffer = Vec::new();
    write_request(&mut buffer, &request).unwrap();

    let mut cursor = Cursor::new(buffer);
    let result = read_request(&mut cursor, 16);
    assert!(matches!(result, Err(KvError::Protocol(ParseError::TooLarge))));
}

#[test]
fn test_stream_read_request_exactly_at_limit() {
    let mut cursor = Cursor::new(b"GET 3:key".to_vec());
    assert!(read_request(&mut cursor, 9).is_ok());
}

#[test]
fn test_stream_read_request_malformed() {
    let mut cursor = Cursor::new(b"DEL 3:key EXTRA".to_vec());
    let result = read_request(&mut cursor, 1024);
    assert!(matches!(
        result,
        Err(KvError::Protocol(ParseError::TrailingData))
    ));
}

/// Hands out its data one byte per `read` and fails if asked for more
struct Trickle {
    data: Vec<u8>,
    pos: usize,
}

impl std::io::Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.data.get(self.pos) {
            Some(&b) => {
                buf[0] = b;
                self.pos += 1;
                Ok(1)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "read past the end of the frame",
            )),
        }
    }
}

#[test]
fn test_read_frame_stops_at_complete_frame_without_eof() {
    for message in [&b"GET 3:key"[..], b"DEL 3:key", b"PUT 3:key 5:value"] {
        let mut reader = Trickle {
            data: message.to_vec(),
            pos: 0,
        };
        let mut buf = BytesMut::new();

        read_frame(&mut reader, &mut buf, 1024).unwrap();
        assert_eq!(&buf[..], message);
    }
}

#[test]
fn test_read_frame_keeps_partial_data_on_error() {
    let mut reader = Trickle {
        data: b"PUT 3:key 5:val".to_vec(),
        pos: 0,
    };
    let mut buf = BytesMut::new();

    assert!(matches!(
        read_frame(&mut reader, &mut buf, 1024),
        Err(KvError::Io(_))
    ));
    assert_eq!(&buf[..], b"PUT 3:key 5:val");
}

#[test]
fn test_stream_write_read_response() {
    let response = Response::value(b"result");

    let mut buffer = Vec::new();
    write_response(&mut buffer, &response).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_response(&mut cursor).unwrap(), response);
}

// =============================================================================
// Frame Completion Tests
// =============================================================================

#[test]
fn test_request_complete_for_whole_frames() {
    assert!(request_complete(b"GET 3:key"));
    assert!(request_complete(b"DEL 3:key"));
    assert!(request_complete(b"PUT 3:key 5:value"));
    assert!(request_complete(b"PUT 7:a b:c d 3:x:y"));
}

#[test]
fn test_request_incomplete_prefixes() {
    let message = b"PUT 3:key 5:value";
    for end in 0..message.len() {
        assert!(
            !request_complete(&message[..end]),
            "prefix {:?} reported complete",
            String::from_utf8_lossy(&message[..end])
        );
    }

    assert!(!request_complete(b"GET 12"));
    assert!(!request_complete(b"GET 12:short"));
}

#[test]
fn test_request_complete_once_invalid() {
    // No further bytes can rescue these
    assert!(request_complete(b"HELLO"));
    assert!(request_complete(b"get "));
    assert!(request_complete(b"GET key"));
    assert!(request_complete(b"GET 0:"));
    assert!(request_complete(b"GET :key"));
    assert!(request_complete(b"PUT 3:keyX"));
    assert!(request_complete(b"PUT 3:key x"));
}

#[test]
fn test_request_complete_leaves_trailing_data_to_decode() {
    let message = b"GET 3:key EXTRA";
    assert!(request_complete(message));
    assert_eq!(decode_request(message), Err(ParseError::TrailingData));
}
