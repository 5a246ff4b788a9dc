//! Strong type definitions for header fields.
//!
//! Fixed-width byte values are newtypes so a state root can never be passed
//! where an address is expected. Integers of unbounded width are carried as
//! [`Quantity`], which cannot hold a negative value.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::canonical::{Encodable, Value};
use crate::error::{CoreError, Result};

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Lowercase hex with a `0x` prefix.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Parse from hex, with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = hex::decode(strip_hex_prefix(s))
                    .map_err(|e| CoreError::InvalidHex(format!("{}: {}", $label, e)))?;
                Self::try_from(bytes.as_slice())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let hex = self.to_hex();
                if hex.len() > 18 {
                    write!(f, "{}({}..)", stringify!($name), &hex[..18])
                } else {
                    write!(f, "{}({})", stringify!($name), hex)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CoreError;

            fn try_from(slice: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = slice.try_into().map_err(|_| {
                    CoreError::invalid_field(
                        $label,
                        format!("expected {} bytes, got {}", $len, slice.len()),
                    )
                })?;
                Ok(Self(arr))
            }
        }

        impl Encodable for $name {
            fn to_value(&self) -> Value {
                Value::Bytes(self.0.to_vec())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 32-byte hash (header identity, roots, mix digest).
    H256, 32, "hash"
);

fixed_bytes!(
    /// A 20-byte account address.
    Address, 20, "address"
);

fixed_bytes!(
    /// A 2048-bit log bloom filter.
    Bloom, 256, "bloom"
);

fixed_bytes!(
    /// The 64-bit header nonce, kept as 8 raw bytes.
    BlockNonce, 8, "nonce"
);

impl BlockNonce {
    /// Big-endian encoding of an integer nonce.
    pub const fn from_u64(n: u64) -> Self {
        Self(n.to_be_bytes())
    }

    /// Interpret the nonce as a big-endian integer.
    pub const fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

/// An arbitrary-precision non-negative integer.
///
/// Stored as its minimal big-endian byte representation: no leading zero
/// bytes, and zero is the empty byte string. This is exactly the form the
/// canonical encoding needs, so encoding never has to trim.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Quantity(Vec<u8>);

impl Quantity {
    /// The integer zero.
    pub const fn zero() -> Self {
        Self(Vec::new())
    }

    /// Build from big-endian bytes, dropping any leading zeros.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self(bytes[start..].to_vec())
    }

    /// Build from bytes that must already be minimal.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.first() == Some(&0) {
            return Err(CoreError::invalid_field(
                "quantity",
                "non-canonical integer with leading zero byte",
            ));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Minimal big-endian bytes (empty for zero).
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of significant bits.
    pub fn bit_len(&self) -> usize {
        match self.0.first() {
            Some(first) => (self.0.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
            None => 0,
        }
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None;
        }
        Some(self.0.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Hex quantity form: `0x` followed by digits without leading zeros,
    /// `0x0` for zero.
    pub fn to_hex(&self) -> String {
        if self.is_zero() {
            return "0x0".to_string();
        }
        let digits = hex::encode(&self.0);
        format!("0x{}", digits.trim_start_matches('0'))
    }

    /// Parse a hex quantity. The `0x` prefix is required, leading zero
    /// digits are rejected (except `0x0`) and a leading `-` is rejected as
    /// a negative value.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.starts_with('-') {
            return Err(CoreError::invalid_field("quantity", "negative value"));
        }
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidHex(format!("missing 0x prefix: {s:?}")))?;
        if digits.is_empty() {
            return Err(CoreError::InvalidHex("empty hex quantity".into()));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(CoreError::InvalidHex(format!(
                "hex quantity with leading zero digits: {s:?}"
            )));
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(padded).map_err(|e| CoreError::InvalidHex(e.to_string()))?;
        Ok(Self::from_be_bytes(&bytes))
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.to_hex())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<u64> for Quantity {
    fn from(n: u64) -> Self {
        Self::from_be_bytes(&n.to_be_bytes())
    }
}

impl From<u32> for Quantity {
    fn from(n: u32) -> Self {
        Self::from(u64::from(n))
    }
}

impl From<u128> for Quantity {
    fn from(n: u128) -> Self {
        Self::from_be_bytes(&n.to_be_bytes())
    }
}

impl TryFrom<i64> for Quantity {
    type Error = CoreError;

    fn try_from(n: i64) -> Result<Self> {
        u64::try_from(n)
            .map(Self::from)
            .map_err(|_| CoreError::invalid_field("quantity", format!("negative value {n}")))
    }
}

impl TryFrom<i128> for Quantity {
    type Error = CoreError;

    fn try_from(n: i128) -> Result<Self> {
        u128::try_from(n)
            .map(Self::from)
            .map_err(|_| CoreError::invalid_field("quantity", format!("negative value {n}")))
    }
}

impl Encodable for Quantity {
    fn to_value(&self) -> Value {
        Value::Uint(self.clone())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Deserializes `u64` fields carried as hex quantities.
pub(crate) mod hex_u64 {
    use super::Quantity;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        let quantity = Quantity::from_hex(&s).map_err(de::Error::custom)?;
        quantity
            .to_u64()
            .ok_or_else(|| de::Error::custom(format!("value {s} overflows u64")))
    }
}

/// Deserializes variable-length byte fields carried as `0x` hex.
pub(crate) mod hex_bytes {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| de::Error::custom(format!("missing 0x prefix: {s:?}")))?;
        hex::decode(digits).map_err(de::Error::custom)
    }
}
