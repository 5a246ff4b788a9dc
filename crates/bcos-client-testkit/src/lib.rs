//! # BCOS Client Testkit
//!
//! Testing utilities for the BCOS client.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Headers with known canonical bytes and identities
//! - **Generators**: Proptest strategies for headers and frames
//! - **Fixtures**: Linked header chains and in-memory channel sessions
//!
//! ## Golden Vectors
//!
//! ```rust
//! use bcos_client_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let header = (vector.header)();
//!     println!("{}: {}", vector.name, header.identity());
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use bcos_client_testkit::generators::header;
//!
//! proptest! {
//!     #[test]
//!     fn identity_is_deterministic(h in header()) {
//!         prop_assert_eq!(h.identity(), h.clone().identity());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use bcos_client_testkit::fixtures::header_chain;
//!
//! let chain = header_chain(3);
//! assert!(chain[2].is_child_of(&chain[1]));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{echo_node, header_chain, EchoFixture, SessionFixture};
pub use generators::{frame, header};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
