//! Block headers and their identity.
//!
//! A header's identity is `keccak256(canonical_bytes(header))`, where the
//! canonical bytes are the fifteen fields below, in declaration order, as one
//! canonical list. The order is part of the contract: swapping two fields
//! produces a different identity.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::canonical::{decode, encode, Encodable, Value};
use crate::crypto::keccak256;
use crate::error::{CoreError, Result};
use crate::types::{hex_bytes, hex_u64, Address, BlockNonce, Bloom, Quantity, H256};

/// Number of fields in the canonical header list.
pub const HEADER_FIELD_COUNT: usize = 15;

/// Metadata of one block, as reported by the node.
///
/// Deserializes from the node's JSON reply field names. Serializing adds a
/// `hash` entry carrying [`Header::identity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Header {
    #[serde(rename = "parentHash")]
    pub parent_hash: H256,
    #[serde(rename = "sha3Uncles")]
    pub uncle_hash: H256,
    #[serde(rename = "miner")]
    pub coinbase: Address,
    #[serde(rename = "stateRoot")]
    pub state_root: H256,
    #[serde(rename = "transactionsRoot")]
    pub transactions_root: H256,
    #[serde(rename = "receiptsRoot")]
    pub receipts_root: H256,
    #[serde(rename = "logsBloom")]
    pub logs_bloom: Bloom,
    pub difficulty: Quantity,
    pub number: Quantity,
    #[serde(rename = "gasLimit", deserialize_with = "hex_u64::deserialize")]
    pub gas_limit: u64,
    #[serde(rename = "gasUsed", deserialize_with = "hex_u64::deserialize")]
    pub gas_used: u64,
    #[serde(deserialize_with = "hex_u64::deserialize")]
    pub timestamp: u64,
    #[serde(rename = "extraData", deserialize_with = "hex_bytes::deserialize")]
    pub extra_data: Vec<u8>,
    #[serde(rename = "mixHash", default)]
    pub mix_digest: H256,
    #[serde(rename = "randomid", default)]
    pub nonce: BlockNonce,
}

impl Header {
    /// Canonical bytes of the header: the pre-image of its identity.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        encode(&self.to_value())
    }

    /// The header's 32-byte identity.
    ///
    /// Recomputed on every call; the header holds no cache.
    pub fn identity(&self) -> H256 {
        keccak256(&self.canonical_bytes())
    }

    /// True if this header names `parent` as its parent.
    ///
    /// A value comparison only; no other chain rule is checked.
    pub fn is_child_of(&self, parent: &Header) -> bool {
        self.parent_hash == parent.identity()
    }

    /// Approximate memory used by the header, for sizing caches.
    pub fn approximate_size(&self) -> usize {
        std::mem::size_of::<Header>()
            + self.extra_data.len()
            + (self.difficulty.bit_len() + self.number.bit_len()) / 8
    }

    /// Decode a header from its canonical bytes.
    ///
    /// The input must be a list of exactly [`HEADER_FIELD_COUNT`] byte strings
    /// with the widths of each field; integers must be minimal.
    pub fn decode_canonical(bytes: &[u8]) -> Result<Self> {
        let value = decode(bytes)?;
        let items = value
            .as_list()
            .ok_or_else(|| CoreError::invalid_field("header", "expected a list"))?;
        if items.len() != HEADER_FIELD_COUNT {
            return Err(CoreError::invalid_field(
                "header",
                format!("expected {} fields, got {}", HEADER_FIELD_COUNT, items.len()),
            ));
        }

        let field = |index: usize, name: &'static str| -> Result<&[u8]> {
            items[index]
                .as_bytes()
                .ok_or_else(|| CoreError::invalid_field(name, "expected a byte string"))
        };
        let hash = |index: usize, name: &'static str| -> Result<H256> {
            H256::try_from(field(index, name)?).map_err(|e| e.for_field(name))
        };
        let quantity = |index: usize, name: &'static str| -> Result<Quantity> {
            Quantity::from_canonical_bytes(field(index, name)?).map_err(|e| e.for_field(name))
        };
        let word = |index: usize, name: &'static str| -> Result<u64> {
            quantity(index, name)?
                .to_u64()
                .ok_or_else(|| CoreError::invalid_field(name, "value overflows u64"))
        };

        Ok(Header {
            parent_hash: hash(0, "parent_hash")?,
            uncle_hash: hash(1, "uncle_hash")?,
            coinbase: Address::try_from(field(2, "coinbase")?)
                .map_err(|e| e.for_field("coinbase"))?,
            state_root: hash(3, "state_root")?,
            transactions_root: hash(4, "transactions_root")?,
            receipts_root: hash(5, "receipts_root")?,
            logs_bloom: Bloom::try_from(field(6, "logs_bloom")?)
                .map_err(|e| e.for_field("logs_bloom"))?,
            difficulty: quantity(7, "difficulty")?,
            number: quantity(8, "number")?,
            gas_limit: word(9, "gas_limit")?,
            gas_used: word(10, "gas_used")?,
            timestamp: word(11, "timestamp")?,
            extra_data: field(12, "extra_data")?.to_vec(),
            mix_digest: hash(13, "mix_digest")?,
            nonce: BlockNonce::try_from(field(14, "nonce")?).map_err(|e| e.for_field("nonce"))?,
        })
    }
}

impl Encodable for Header {
    fn to_value(&self) -> Value {
        Value::List(vec![
            self.parent_hash.to_value(),
            self.uncle_hash.to_value(),
            self.coinbase.to_value(),
            self.state_root.to_value(),
            self.transactions_root.to_value(),
            self.receipts_root.to_value(),
            self.logs_bloom.to_value(),
            self.difficulty.to_value(),
            self.number.to_value(),
            self.gas_limit.to_value(),
            self.gas_used.to_value(),
            self.timestamp.to_value(),
            Value::Bytes(self.extra_data.clone()),
            self.mix_digest.to_value(),
            self.nonce.to_value(),
        ])
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Header", HEADER_FIELD_COUNT + 1)?;
        state.serialize_field("parentHash", &self.parent_hash)?;
        state.serialize_field("sha3Uncles", &self.uncle_hash)?;
        state.serialize_field("miner", &self.coinbase)?;
        state.serialize_field("stateRoot", &self.state_root)?;
        state.serialize_field("transactionsRoot", &self.transactions_root)?;
        state.serialize_field("receiptsRoot", &self.receipts_root)?;
        state.serialize_field("logsBloom", &self.logs_bloom)?;
        state.serialize_field("difficulty", &self.difficulty)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("gasLimit", &format!("{:#x}", self.gas_limit))?;
        state.serialize_field("gasUsed", &format!("{:#x}", self.gas_used))?;
        state.serialize_field("timestamp", &format!("{:#x}", self.timestamp))?;
        state.serialize_field("extraData", &format!("0x{}", hex::encode(&self.extra_data)))?;
        state.serialize_field("mixHash", &self.mix_digest)?;
        state.serialize_field("randomid", &self.nonce)?;
        state.serialize_field("hash", &self.identity())?;
        state.end()
    }
}

/// Compute the identity of a header.
pub fn header_identity(header: &Header) -> H256 {
    header.identity()
}

/// Builder for headers, starting from all-zero fields.
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
    header: Header,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link to `parent` by copying its identity into `parent_hash`.
    pub fn parent(mut self, parent: &Header) -> Self {
        self.header.parent_hash = parent.identity();
        self
    }

    pub fn parent_hash(mut self, hash: H256) -> Self {
        self.header.parent_hash = hash;
        self
    }

    pub fn uncle_hash(mut self, hash: H256) -> Self {
        self.header.uncle_hash = hash;
        self
    }

    pub fn coinbase(mut self, address: Address) -> Self {
        self.header.coinbase = address;
        self
    }

    pub fn state_root(mut self, root: H256) -> Self {
        self.header.state_root = root;
        self
    }

    pub fn transactions_root(mut self, root: H256) -> Self {
        self.header.transactions_root = root;
        self
    }

    pub fn receipts_root(mut self, root: H256) -> Self {
        self.header.receipts_root = root;
        self
    }

    pub fn logs_bloom(mut self, bloom: Bloom) -> Self {
        self.header.logs_bloom = bloom;
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<Quantity>) -> Self {
        self.header.difficulty = difficulty.into();
        self
    }

    pub fn number(mut self, number: impl Into<Quantity>) -> Self {
        self.header.number = number.into();
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.header.gas_limit = gas_limit;
        self
    }

    pub fn gas_used(mut self, gas_used: u64) -> Self {
        self.header.gas_used = gas_used;
        self
    }

    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.header.timestamp = timestamp;
        self
    }

    pub fn extra_data(mut self, extra: impl Into<Vec<u8>>) -> Self {
        self.header.extra_data = extra.into();
        self
    }

    pub fn mix_digest(mut self, digest: H256) -> Self {
        self.header.mix_digest = digest;
        self
    }

    pub fn nonce(mut self, nonce: BlockNonce) -> Self {
        self.header.nonce = nonce;
        self
    }

    pub fn build(self) -> Header {
        self.header
    }
}
