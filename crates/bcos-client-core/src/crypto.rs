//! Keccak-256 content hashing.
//!
//! The node hashes with the original Keccak submission (padding byte `0x01`),
//! not the standardized SHA3-256 (padding byte `0x06`). The two disagree on
//! every input, so only [`sha3::Keccak256`] is used here.

use sha3::{Digest, Keccak256};

use crate::types::H256;

/// Keccak-256 of the canonical encoding of an empty list.
pub const EMPTY_UNCLE_HASH: H256 = H256([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4,
    0x1a, 0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4,
    0x93, 0x47,
]);

/// Keccak-256 of the canonical encoding of an empty byte string; the root of
/// an empty trie.
pub const EMPTY_ROOT_HASH: H256 = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8,
    0x6e, 0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63,
    0xb4, 0x21,
]);

/// Compute the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental Keccak-256.
#[derive(Clone, Default)]
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Feed more input.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Consume the hasher and return the digest.
    pub fn finalize(self) -> H256 {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.finalize());
        H256(out)
    }
}
