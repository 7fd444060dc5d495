//! Response definitions
//!
//! Represents the outcome of one request and how it renders on the wire.

use std::fmt;

/// Outcome kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Ok,
    NotFound,
    ParseError,
    InternalError,
}

impl Kind {
    /// Lowercase token used inside the brackets
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Ok => "ok",
            Kind::NotFound => "not_found",
            Kind::ParseError => "parse_error",
            Kind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Outcome kind
    pub kind: Kind,

    /// Optional payload (value for `ok`, message for every other kind)
    pub payload: Option<String>,
}

impl Response {
    /// Create an OK response with optional value
    pub fn ok(value: Option<String>) -> Self {
        Self {
            kind: Kind::Ok,
            payload: value,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: impl fmt::Display) -> Self {
        Self::with_message(Kind::NotFound, message)
    }

    /// Create a PARSE_ERROR response
    pub fn parse_error(message: impl fmt::Display) -> Self {
        Self::with_message(Kind::ParseError, message)
    }

    /// Create an INTERNAL_ERROR response
    pub fn internal_error(message: impl fmt::Display) -> Self {
        Self::with_message(Kind::InternalError, message)
    }

    fn with_message(kind: Kind, message: impl fmt::Display) -> Self {
        Self {
            kind,
            payload: Some(message.to_string()),
        }
    }
}

/// Renders `[kind]` or `[kind] payload`. An empty payload is omitted
/// together with its separating space.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload.as_deref() {
            Some(payload) if !payload.is_empty() => write!(f, "[{}] {}", self.kind, payload),
            _ => write!(f, "[{}]", self.kind),
        }
    }
}
