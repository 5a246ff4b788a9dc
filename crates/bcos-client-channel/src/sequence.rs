//! Correlation sequences.
//!
//! Every correlated frame carries a 128-bit sequence so its response can be
//! routed back to the caller on a multiplexed connection. Heartbeats and
//! topic multicasts carry [`Seq::ZERO`] instead.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::Mutex;

use crate::error::{ChannelError, Result};

/// A 16-byte correlation sequence, transmitted as raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Seq(pub [u8; 16]);

impl Seq {
    /// Width in bytes on the wire.
    pub const LEN: usize = 16;

    /// The reserved "no correlation" sequence.
    pub const ZERO: Self = Self([0u8; 16]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 16]
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq({})", self.to_hex())
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 16]> for Seq {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Source of correlation sequences.
///
/// Implementations must be safe to call from many tasks at once and must
/// never return [`Seq::ZERO`] from [`SequenceGenerator::next`].
pub trait SequenceGenerator: Send + Sync {
    /// A fresh, statistically unique sequence.
    fn next(&self) -> Result<Seq>;

    /// The reserved zero sequence.
    fn zero(&self) -> Seq {
        Seq::ZERO
    }
}

/// Generates sequences from 16 random bytes laid out as a version 4 UUID.
///
/// The version nibble is always `4`, so a generated value can never be all
/// zero. The RNG is held behind a mutex, which serializes access for
/// stateful sources.
pub struct RandomSequence<R = OsRng> {
    rng: Mutex<R>,
}

impl RandomSequence<OsRng> {
    /// Generator backed by the operating system's entropy source.
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for RandomSequence<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> RandomSequence<R> {
    /// Generator backed by a caller-supplied cryptographic RNG.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> SequenceGenerator for RandomSequence<R> {
    fn next(&self) -> Result<Seq> {
        let mut bytes = [0u8; 16];
        {
            let mut rng = self.rng.lock().map_err(|_| {
                ChannelError::GenerationExhausted("sequence source lock poisoned".into())
            })?;
            rng.try_fill_bytes(&mut bytes)
                .map_err(|e| ChannelError::GenerationExhausted(e.to_string()))?;
        }
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Ok(Seq(*id.as_bytes()))
    }
}

impl<R> fmt::Debug for RandomSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RandomSequence")
    }
}
