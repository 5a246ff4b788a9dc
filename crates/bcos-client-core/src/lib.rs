//! # BCOS Client Core
//!
//! Pure primitives for the BCOS client: canonical encoding, Keccak-256
//! hashing, and block header identity.
//!
//! This crate contains no I/O and no networking.
//!
//! ## Key Types
//!
//! - [`Header`] - Block metadata as reported by the node
//! - [`H256`] - 32-byte hash; the type of a header identity
//! - [`Quantity`] - Arbitrary-precision non-negative integer
//! - [`Value`] - Canonical encoding value tree
//!
//! ## Identity
//!
//! A header's identity is the Keccak-256 digest of its canonical encoding.
//! See [`canonical`] for the encoding rules and [`crypto`] for the hash.
//!
//! ```rust
//! use bcos_client_core::{Header, HeaderBuilder};
//!
//! let genesis = Header::default();
//! let child = HeaderBuilder::new().parent(&genesis).number(1u64).build();
//! assert!(child.is_child_of(&genesis));
//! ```

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod header;
pub mod types;

pub use canonical::{decode, encode, Encodable, Value};
pub use crypto::{keccak256, Keccak256Hasher, EMPTY_ROOT_HASH, EMPTY_UNCLE_HASH};
pub use error::{CoreError, Result};
pub use header::{header_identity, Header, HeaderBuilder, HEADER_FIELD_COUNT};
pub use types::{Address, BlockNonce, Bloom, Quantity, H256};
