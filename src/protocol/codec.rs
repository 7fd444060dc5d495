//! Protocol codec
//!
//! Parsing, rendering and message framing for the wire protocol.
//!
//! ## Framing
//! One request per write, one response per write, no terminator on the
//! wire. A request is whatever a single read returns; a read that fills
//! the whole buffer is treated as oversized. One trailing `\n` or `\r\n`
//! on a request is tolerated and stripped so interactive clients work.

use std::io::{Read, Write};

use crate::error::{KvError, ParseError, Result};
use super::{Command, CommandType, Response};

/// Token separator inside a request
const SEPARATOR: char = ' ';

// =============================================================================
// Parse / Render
// =============================================================================

/// Parse a raw request into a command
///
/// The request is split on single spaces, the first token is matched
/// case-sensitively against the command table, and the remaining tokens
/// must match the command's arity exactly.
pub fn parse_command(request: &str) -> std::result::Result<Command, ParseError> {
    if request.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let mut tokens = request.split(SEPARATOR);
    let name = tokens.next().unwrap_or_default();
    let command_type = CommandType::from_name(name)
        .ok_or_else(|| ParseError::UnsupportedCommand(name.to_string()))?;

    let args: Vec<&str> = tokens.collect();
    if args.len() != command_type.arity() {
        return Err(ParseError::InvalidArgumentCount);
    }

    let command = match (command_type, args.as_slice()) {
        (CommandType::Set, [key, value]) => Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        },
        (CommandType::Get, [key]) => Command::Get {
            key: key.to_string(),
        },
        (CommandType::Del, [key]) => Command::Del {
            key: key.to_string(),
        },
        _ => return Err(ParseError::InvalidArgumentCount),
    };

    Ok(command)
}

/// Render a response into its wire form
pub fn render_response(response: &Response) -> String {
    response.to_string()
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// One read into `buf`
///
/// Returns `Ok(None)` on EOF. The flag is set when the read filled the
/// whole buffer, i.e. the message may not have fit.
fn read_message<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<Option<(String, bool)>> {
    let read = reader.read(buf)?;
    if read == 0 {
        return Ok(None);
    }

    let mut message = &buf[..read];
    if let Some(rest) = message.strip_suffix(b"\n") {
        message = rest.strip_suffix(b"\r").unwrap_or(rest);
    }

    Ok(Some((
        String::from_utf8_lossy(message).into_owned(),
        read == buf.len(),
    )))
}

/// Read one request from a stream
///
/// Blocks until data, EOF, or an error. Returns `Ok(None)` when the peer
/// closed the connection. `buf.len()` is the maximum message size.
pub fn read_request<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<Option<String>> {
    match read_message(reader, buf)? {
        None => Ok(None),
        Some((_, true)) => Err(KvError::MessageTooLarge { limit: buf.len() }),
        Some((request, false)) => Ok(Some(request)),
    }
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &str) -> Result<()> {
    writer.write_all(request.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one response from a stream
///
/// A closed connection is an error here: every request gets a response.
pub fn read_response<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<String> {
    match read_message(reader, buf)? {
        None => Err(KvError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before a response was received",
        ))),
        Some((_, true)) => Err(KvError::ResponseTooLarge { limit: buf.len() }),
        Some((response, false)) => Ok(response),
    }
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &str) -> Result<()> {
    writer.write_all(response.as_bytes())?;
    writer.flush()?;
    Ok(())
}
