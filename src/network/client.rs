//! Client side of the protocol
//!
//! One request per connection: connect, write, half-close, read until
//! the server closes.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_response, write_request, Request, Response, MAX_RESPONSE_SIZE};

/// Send raw request bytes and return the raw response bytes
pub fn send_raw<A: ToSocketAddrs>(addr: A, message: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
    let mut stream = connect(addr, timeout)?;

    stream.write_all(message)?;
    stream.flush()?;
    stream.shutdown(Shutdown::Write)?;

    let mut response = Vec::new();
    (&mut stream).take(MAX_RESPONSE_SIZE).read_to_end(&mut response)?;
    Ok(response)
}

/// Send a request and decode the server's answer
pub fn send<A: ToSocketAddrs>(addr: A, request: &Request, timeout: Option<Duration>) -> Result<Response> {
    let mut stream = connect(addr, timeout)?;

    write_request(&mut stream, request)?;
    stream.shutdown(Shutdown::Write)?;

    read_response(&mut stream)
}

fn connect<A: ToSocketAddrs>(addr: A, timeout: Option<Duration>) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    Ok(stream)
}
