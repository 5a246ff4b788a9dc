//! Canonical (RLP) encoding for deterministic serialization.
//!
//! Rules:
//! - Integers use their minimal big-endian bytes; zero is the empty string
//! - A single byte below `0x80` is its own encoding
//! - Other byte strings carry a length prefix (`0x80 + len`, or
//!   `0xb7 + len_of_len` followed by the length when longer than 55 bytes)
//! - Lists are the concatenation of their encoded items under an outer
//!   prefix (`0xc0 + len`, or `0xf7 + len_of_len`)
//!
//! The encoding is the pre-image of header identity. It is FROZEN: any change
//! breaks compatibility with every other implementation on the network.

use crate::error::{CoreError, Result};
use crate::types::Quantity;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;

/// A value that can be canonically encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A raw byte string.
    Bytes(Vec<u8>),
    /// A non-negative integer.
    Uint(Quantity),
    /// A nested list.
    List(Vec<Value>),
}

impl Value {
    /// Borrow the byte string, if this is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(Quantity::from(n))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

/// Types with a fixed canonical shape.
pub trait Encodable {
    /// The value tree this type encodes as.
    fn to_value(&self) -> Value;

    /// Canonical bytes of [`Encodable::to_value`].
    fn canonical_bytes(&self) -> Vec<u8> {
        encode(&self.to_value())
    }
}

impl Encodable for u64 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Encodable for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

/// Encode a value to canonical bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_to(&mut buf, value);
    buf
}

/// Append the canonical encoding of `value` to `buf`.
pub fn encode_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Bytes(bytes) => encode_string(buf, bytes),
        Value::Uint(q) => encode_string(buf, q.as_be_bytes()),
        Value::List(items) => {
            let mut payload = Vec::new();
            for item in items {
                encode_to(&mut payload, item);
            }
            encode_length(buf, payload.len(), LIST_OFFSET);
            buf.extend_from_slice(&payload);
        }
    }
}

fn encode_string(buf: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        buf.push(bytes[0]);
    } else {
        encode_length(buf, bytes.len(), STRING_OFFSET);
        buf.extend_from_slice(bytes);
    }
}

fn encode_length(buf: &mut Vec<u8>, len: usize, offset: u8) {
    if len <= SHORT_LIMIT {
        buf.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let start = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[start..];
        buf.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
        buf.extend_from_slice(len_bytes);
    }
}

/// Decode canonical bytes into a value tree.
///
/// Strings decode as [`Value::Bytes`]; whether a string is an integer is up
/// to the caller's shape. Input that is not the unique canonical encoding of
/// its value is rejected.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let (value, rest) = decode_item(bytes)?;
    if !rest.is_empty() {
        return Err(CoreError::MalformedEncoding(format!(
            "{} trailing bytes",
            rest.len()
        )));
    }
    Ok(value)
}

fn decode_item(input: &[u8]) -> Result<(Value, &[u8])> {
    let (&prefix, tail) = input
        .split_first()
        .ok_or_else(|| CoreError::MalformedEncoding("unexpected end of input".into()))?;

    match prefix {
        0x00..=0x7f => Ok((Value::Bytes(vec![prefix]), tail)),
        0x80..=0xb7 => {
            let len = usize::from(prefix - STRING_OFFSET);
            let (payload, rest) = take(tail, len)?;
            if len == 1 && payload[0] < STRING_OFFSET {
                return Err(CoreError::MalformedEncoding(
                    "single byte below 0x80 must not carry a prefix".into(),
                ));
            }
            Ok((Value::Bytes(payload.to_vec()), rest))
        }
        0xb8..=0xbf => {
            let len_of_len = usize::from(prefix - STRING_OFFSET - SHORT_LIMIT as u8);
            let (len, tail) = read_long_length(tail, len_of_len)?;
            let (payload, rest) = take(tail, len)?;
            Ok((Value::Bytes(payload.to_vec()), rest))
        }
        0xc0..=0xf7 => {
            let len = usize::from(prefix - LIST_OFFSET);
            let (payload, rest) = take(tail, len)?;
            Ok((Value::List(decode_list(payload)?), rest))
        }
        0xf8..=0xff => {
            let len_of_len = usize::from(prefix - LIST_OFFSET - SHORT_LIMIT as u8);
            let (len, tail) = read_long_length(tail, len_of_len)?;
            let (payload, rest) = take(tail, len)?;
            Ok((Value::List(decode_list(payload)?), rest))
        }
    }
}

fn decode_list(mut payload: &[u8]) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, rest) = decode_item(payload)?;
        items.push(item);
        payload = rest;
    }
    Ok(items)
}

fn read_long_length(input: &[u8], len_of_len: usize) -> Result<(usize, &[u8])> {
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(CoreError::MalformedEncoding("length prefix too large".into()));
    }
    let (len_bytes, rest) = take(input, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(CoreError::MalformedEncoding(
            "length prefix has leading zero".into(),
        ));
    }
    let len = len_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
    if len <= SHORT_LIMIT {
        return Err(CoreError::MalformedEncoding(
            "long form used for short payload".into(),
        ));
    }
    Ok((len, rest))
}

fn take(input: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if input.len() < len {
        return Err(CoreError::MalformedEncoding(format!(
            "truncated input: need {} bytes, have {}",
            len,
            input.len()
        )));
    }
    Ok(input.split_at(len))
}
