//! # BCOS Client
//!
//! Core of a BCOS blockchain client: deterministic block-header identity and
//! the multiplexed channel sub-protocol used to talk to a node.
//!
//! ## Overview
//!
//! - **Canonical encoding**: headers serialize to one exact byte sequence
//! - **Header identity**: the Keccak-256 hash of that sequence
//! - **Channel sessions**: correlated requests, pushes and heartbeats over a
//!   single connection
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bcos_client::{Client, ClientConfig, HeaderBuilder, MemoryTransport};
//!
//! async fn example() -> bcos_client::Result<()> {
//!     let header = HeaderBuilder::new().number(1u64).gas_limit(30_000_000).build();
//!     println!("block identity {}", header.identity());
//!
//!     let config = ClientConfig::from_json_str(r#"{"request_timeout_ms": 5000}"#)?;
//!     bcos_client::telemetry::init_tracing(&config.log_filter)?;
//!
//!     let (transport, _node) = MemoryTransport::pair(64);
//!     let (client, _pushes) = Client::connect(transport, &config)?;
//!     let response = client.call(&br#"{"method":"getBlockNumber"}"#[..]).await?;
//!     println!("result code {}", response.result);
//!     client.shutdown().await
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `bcos_client::core` - Encoding, hashing, header identity
//! - `bcos_client::channel` - Frames, sequences, transports, sessions

pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;

pub use bcos_client_channel as channel;
pub use bcos_client_core as core;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};

pub use bcos_client_channel::{
    ChannelConfig, ChannelFrameType, ChannelSession, Frame, MemoryTransport, RandomSequence, Seq,
    SequenceGenerator, StreamTransport, Transport,
};
pub use bcos_client_core::{
    header_identity, keccak256, Address, BlockNonce, Bloom, Header, HeaderBuilder, Quantity, H256,
};
