//! Golden header vectors.
//!
//! Expected values were produced by an independent legacy Keccak-256 and
//! canonical list encoder. Any change to field order, integer encoding or
//! the hash function shows up here first.

use bcos_client_core::{
    Address, BlockNonce, Bloom, Header, HeaderBuilder, Quantity, EMPTY_UNCLE_HASH, H256,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Builds the input header.
    pub header: fn() -> Header,
    /// Expected length of the canonical bytes.
    pub expected_len: usize,
    /// Expected first bytes of the canonical encoding (hex).
    pub expected_prefix: &'static str,
    /// Expected identity (hex, no prefix).
    pub expected_identity: &'static str,
}

/// The all-zero header; the baseline every implementation must agree on.
pub fn zero_header() -> Header {
    Header::default()
}

/// A plausible mid-chain header.
pub fn sample_header() -> Header {
    HeaderBuilder::new()
        .parent_hash(H256::from_bytes([0x11; 32]))
        .uncle_hash(EMPTY_UNCLE_HASH)
        .coinbase(Address::from_bytes([0xab; 20]))
        .state_root(H256::from_bytes([0x22; 32]))
        .transactions_root(H256::from_bytes([0x33; 32]))
        .receipts_root(H256::from_bytes([0x44; 32]))
        .difficulty(1u64)
        .number(100u64)
        .gas_limit(30_000_000)
        .gas_used(21_000)
        .timestamp(1_700_000_000)
        .extra_data(b"bcos".to_vec())
        .mix_digest(H256::from_bytes([0x55; 32]))
        .nonce(BlockNonce::from_u64(42))
        .build()
}

/// Integers at and past the 64-bit boundary, a non-empty bloom and the
/// single-byte / short-string edge (127 vs 128).
pub fn boundary_header() -> Header {
    let mut bloom = [0u8; 256];
    bloom[0] = 0x80;
    bloom[255] = 0x01;
    let mut coinbase = [0u8; 20];
    for (i, b) in coinbase.iter_mut().enumerate() {
        *b = i as u8;
    }
    HeaderBuilder::new()
        .parent_hash(H256::from_bytes([0xff; 32]))
        .uncle_hash(EMPTY_UNCLE_HASH)
        .coinbase(Address::from_bytes(coinbase))
        .state_root(H256::from_bytes([0x01; 32]))
        .transactions_root(H256::from_bytes([0x02; 32]))
        .receipts_root(H256::from_bytes([0x03; 32]))
        .logs_bloom(Bloom::from_bytes(bloom))
        .difficulty(Quantity::from(1u128 << 64))
        .number(1u64 << 63)
        .gas_limit(u64::MAX)
        .gas_used(127)
        .timestamp(128)
        .extra_data((0u8..32).collect::<Vec<u8>>())
        .mix_digest(H256::from_bytes([0x0f; 32]))
        .nonce(BlockNonce::from_u64(u64::MAX))
        .build()
}

/// Extra data one byte past the short-string limit.
pub fn long_extra_header() -> Header {
    HeaderBuilder::new()
        .number(1u64)
        .extra_data(vec![0x7f; 56])
        .build()
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "zero header",
            header: zero_header,
            expected_len: 496,
            expected_prefix: "f901eda0",
            expected_identity: "c3bd2d00745c03048a5616146a96f5ff78e54efb9e5b04af208cdaff6f3830ee",
        },
        GoldenVector {
            name: "sample header",
            header: sample_header,
            expected_len: 510,
            expected_prefix: "f901fba011",
            expected_identity: "e7790023b9c9ef9935d01ed88a25e43eb3696b1bd956ae2c0da1dd6877379854",
        },
        GoldenVector {
            name: "64-bit boundary header",
            header: boundary_header,
            expected_len: 554,
            expected_prefix: "f90227a0ff",
            expected_identity: "7ef344b3d5c0c42b4e9423f0f408d7e1a19b5e293250b45347305000ba5222f9",
        },
        GoldenVector {
            name: "long extra data header",
            header: long_extra_header,
            expected_len: 553,
            expected_prefix: "f90226a000",
            expected_identity: "f46dfc7e0e86040d98d13d711c4e1cf2c13c736ac83e7257e9766f23c179808e",
        },
    ]
}

/// Check every vector, returning the names of those that fail.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| {
            let header = (v.header)();
            let bytes = header.canonical_bytes();
            bytes.len() != v.expected_len
                || !hex::encode(&bytes).starts_with(v.expected_prefix)
                || hex::encode(header.identity().as_bytes()) != v.expected_identity
        })
        .map(|v| v.name)
        .collect()
}
