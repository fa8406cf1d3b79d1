//! Stored value representation
//!
//! Values cross the backend boundary as either an integer (written by counter
//! operations or by numeric conditional writes) or an opaque byte string.

use std::fmt;

use bytes::Bytes;

// == Value ==
/// A value held in a bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Decimal integer, used by increment and decrement
    Integer(i64),
    /// Raw payload as received
    Bytes(Bytes),
}

impl Value {
    // == From Body ==
    /// Coerces a request body the way conditional writes do.
    ///
    /// A body made only of decimal digits (optionally followed by one newline)
    /// that fits an `i64` is stored as an integer; anything else is kept as bytes.
    pub fn from_body(body: Bytes) -> Self {
        let digits = body.strip_suffix(b"\n").unwrap_or(&body);
        if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) {
            if let Some(n) = std::str::from_utf8(digits)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
            {
                return Value::Integer(n);
            }
        }
        Value::Bytes(body)
    }

    // == As Integer ==
    /// Returns the value as an integer if it is numeric in full.
    ///
    /// Byte strings qualify only when the whole payload parses as an `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
        }
    }

    // == Coerce Integer ==
    /// Lenient integer reading: leading digits count, anything else is zero.
    pub fn coerce_integer(&self) -> i64 {
        match self {
            Value::Integer(n) => *n,
            Value::Bytes(b) => leading_integer(b),
        }
    }

    /// Renders the value as response bytes.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Value::Integer(n) => Bytes::from(n.to_string()),
            Value::Bytes(b) => b.clone(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

// == Leading Integer ==
/// Parses the integer prefix of `input`.
///
/// Leading whitespace and one sign are accepted, underscores between digits
/// are skipped, and parsing stops at the first other byte. No digits yields 0.
/// Out-of-range values saturate.
pub fn leading_integer(input: &[u8]) -> i64 {
    let mut rest = input;
    while let Some((first, tail)) = rest.split_first() {
        if !first.is_ascii_whitespace() {
            break;
        }
        rest = tail;
    }

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut acc: i64 = 0;
    let mut prev_digit = false;
    for &byte in rest {
        match byte {
            b'0'..=b'9' => {
                let digit = i64::from(byte - b'0');
                acc = if negative {
                    acc.saturating_mul(10).saturating_sub(digit)
                } else {
                    acc.saturating_mul(10).saturating_add(digit)
                };
                prev_digit = true;
            }
            b'_' if prev_digit => prev_digit = false,
            _ => break,
        }
    }
    acc
}
