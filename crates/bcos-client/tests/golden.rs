//! Golden test vectors for cross-implementation verification.
//!
//! Every implementation of header identity must produce identical:
//! - canonical_bytes
//! - identity

use bcos_client::core::{decode, encode, CoreError, Value, EMPTY_ROOT_HASH, EMPTY_UNCLE_HASH};
use bcos_client::{keccak256, Address, BlockNonce, Header, HeaderBuilder, Quantity, H256};
use serde::{Deserialize, Serialize};

/// A single golden test vector.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub description: String,

    // Input
    pub header: serde_json::Value,

    // Derived outputs (hex)
    pub canonical_bytes: String,
    pub identity: String,
}

fn generate_vector(name: &str, description: &str, header: &Header) -> GoldenVector {
    GoldenVector {
        name: name.to_string(),
        description: description.to_string(),
        header: serde_json::to_value(header).unwrap(),
        canonical_bytes: hex::encode(header.canonical_bytes()),
        identity: hex::encode(header.identity().as_bytes()),
    }
}

fn sample_header() -> Header {
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

pub fn generate_all_vectors() -> Vec<GoldenVector> {
    vec![
        generate_vector(
            "zero_header",
            "Every field zero or empty",
            &Header::default(),
        ),
        generate_vector(
            "sample_header",
            "Block 100 with distinct values in every field",
            &sample_header(),
        ),
        generate_vector(
            "child_of_sample",
            "Block 101 linked to the sample header",
            &HeaderBuilder::new()
                .parent(&sample_header())
                .number(101u64)
                .timestamp(1_700_000_001)
                .build(),
        ),
    ]
}

#[test]
fn test_zero_header_baseline() {
    let header = Header::default();
    let bytes = header.canonical_bytes();

    assert_eq!(bytes.len(), 496);
    assert_eq!(&bytes[..4], &[0xf9, 0x01, 0xed, 0xa0]);
    assert_eq!(
        hex::encode(header.identity().as_bytes()),
        "c3bd2d00745c03048a5616146a96f5ff78e54efb9e5b04af208cdaff6f3830ee"
    );
    assert_eq!(bcos_client::header_identity(&header), header.identity());
}

#[test]
fn test_sample_header_identity() {
    let header = sample_header();
    let bytes = header.canonical_bytes();

    assert_eq!(bytes.len(), 510);
    assert!(hex::encode(&bytes).starts_with("f901fba01111"));
    assert_eq!(
        header.identity().to_hex(),
        "0xe7790023b9c9ef9935d01ed88a25e43eb3696b1bd956ae2c0da1dd6877379854"
    );
    assert_eq!(header.identity(), keccak256(&bytes));
}

#[test]
fn test_vectors_deterministic() {
    // Generate twice, must be identical
    let v1 = generate_all_vectors();
    let v2 = generate_all_vectors();

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert_eq!(a.canonical_bytes, b.canonical_bytes, "bytes mismatch for {}", a.name);
        assert_eq!(a.identity, b.identity, "identity mismatch for {}", a.name);
    }
}

#[test]
fn test_vectors_reload_from_json() -> anyhow::Result<()> {
    for v in generate_all_vectors() {
        let json = serde_json::to_string(&v)?;
        let reloaded: GoldenVector = serde_json::from_str(&json)?;
        let header: Header = serde_json::from_value(reloaded.header)?;

        assert_eq!(hex::encode(header.canonical_bytes()), v.canonical_bytes, "{}", v.name);
        assert_eq!(hex::encode(header.identity().as_bytes()), v.identity, "{}", v.name);
    }
    Ok(())
}

#[test]
fn test_empty_hash_constants() {
    assert_eq!(keccak256(&encode(&Value::List(vec![]))), EMPTY_UNCLE_HASH);
    assert_eq!(keccak256(&encode(&Value::Bytes(vec![]))), EMPTY_ROOT_HASH);
}

#[test]
fn test_vector_file_json_parses_back() -> anyhow::Result<()> {
    #[derive(Serialize, Deserialize)]
    struct VectorFile {
        version: String,
        hash: String,
        vectors: Vec<GoldenVector>,
    }

    let file = VectorFile {
        version: env!("CARGO_PKG_VERSION").to_string(),
        hash: "keccak256 (legacy padding)".to_string(),
        vectors: generate_all_vectors(),
    };

    let json = serde_json::to_string_pretty(&file)?;
    let parsed: VectorFile = serde_json::from_str(&json)?;

    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(parsed.vectors.len(), 3);
    let names: Vec<&str> = parsed.vectors.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["zero_header", "sample_header", "child_of_sample"]);
    assert_eq!(
        parsed.vectors[0].identity,
        "c3bd2d00745c03048a5616146a96f5ff78e54efb9e5b04af208cdaff6f3830ee"
    );
    assert_eq!(
        parsed.vectors[1].identity,
        "e7790023b9c9ef9935d01ed88a25e43eb3696b1bd956ae2c0da1dd6877379854"
    );
    for (v, original) in parsed.vectors.iter().zip(&file.vectors) {
        let header: Header = serde_json::from_value(v.header.clone())?;
        assert_eq!(hex::encode(header.canonical_bytes()), original.canonical_bytes, "{}", v.name);
    }
    Ok(())
}

// =============================================================================
// REJECTION TEST VECTORS
// These test that invalid inputs are properly rejected.
// =============================================================================

#[test]
fn test_reject_negative_integers() {
    assert!(Quantity::try_from(-1i64).is_err());
    assert!(serde_json::from_str::<Quantity>(r#""-0x1""#).is_err());
}

#[test]
fn test_reject_wrong_field_count() {
    let mut fields = match decode(&Header::default().canonical_bytes()).unwrap() {
        Value::List(fields) => fields,
        other => panic!("expected list, got {other:?}"),
    };
    fields.pop();
    let short = encode(&Value::List(fields));

    assert!(Header::decode_canonical(&short).is_err());
}

#[test]
fn test_reject_non_canonical_integer() {
    // 0x00 is not the canonical encoding of zero.
    assert!(matches!(decode(&[0x81, 0x00]), Err(CoreError::MalformedEncoding(_))));
    assert!(matches!(decode(&[0x82, 0x00, 0x01]), Ok(Value::Bytes(_))));
    assert!(Quantity::from_canonical_bytes(&[0x00, 0x01]).is_err());
}

#[test]
fn test_reject_trailing_bytes() {
    let mut bytes = Header::default().canonical_bytes();
    bytes.push(0x80);
    assert!(Header::decode_canonical(&bytes).is_err());
}
