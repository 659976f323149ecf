//! Opaque cursor encoding
//!
//! Every cursor handed to a client (page tokens, sync tokens) is the
//! standard base64 encoding of a decimal ASCII integer: an offset for page
//! tokens, nanoseconds since the Unix epoch for sync tokens. Tokens are not
//! signed and decode to readable numbers on purpose.
//!
//! Decoding is total. Anything that is not a valid token decodes to `0`, so
//! a client holding a stale or truncated cursor restarts from the beginning
//! instead of failing its sync loop.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// Encode an integer as an opaque token
pub fn encode(value: u64) -> String {
    STANDARD.encode(value.to_string())
}

/// Decode an opaque token, returning `0` for any malformed input
pub fn decode(token: &str) -> u64 {
    STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Encode an instant as a sync token (nanosecond resolution)
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    let nanos = at.timestamp_nanos_opt().unwrap_or(0).max(0);
    encode(nanos as u64)
}

/// Decode a sync token into the instant it was minted at
///
/// Malformed tokens decode to the Unix epoch.
pub fn decode_timestamp(token: &str) -> DateTime<Utc> {
    let nanos = i64::try_from(decode(token)).unwrap_or(0);
    DateTime::from_timestamp_nanos(nanos)
}

/// Position within a full-sync walk
///
/// Built from the incoming page token and consumed within the same request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageCursor(u64);

impl PageCursor {
    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    /// Cursor for an optional page token; absent or empty means the first page
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self(decode(token)),
            _ => Self(0),
        }
    }

    pub fn offset(self) -> u64 {
        self.0
    }

    /// Cursor for the page following a window of `by` items
    pub fn advance(self, by: usize) -> Self {
        Self(self.0.saturating_add(by as u64))
    }

    pub fn to_token(self) -> String {
        encode(self.0)
    }
}
