//! # BCOS Client Channel
//!
//! The channel sub-protocol between an SDK client and a node.
//!
//! ## Overview
//!
//! A single connection carries many interleaved conversations. Every frame
//! has a kind ([`ChannelFrameType`]) and a 128-bit correlation sequence
//! ([`Seq`]); a response carries the sequence of its request so it can be
//! routed back to the caller that is waiting for it.
//!
//! ## Key Properties
//!
//! - **Closed kind set**: unknown tags are rejected, never defaulted
//! - **Reserved zero**: heartbeats and multicasts use [`Seq::ZERO`]; generated
//!   sequences are never zero
//! - **Concurrent**: any number of callers may wait on one session
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bcos_client_channel::{
//!     ChannelConfig, ChannelFrameType, ChannelSession, MemoryTransport, RandomSequence,
//! };
//!
//! async fn example() -> bcos_client_channel::Result<()> {
//!     let (local, _node) = MemoryTransport::pair(64);
//!     let (session, _pushes) =
//!         ChannelSession::new(local, RandomSequence::new(), ChannelConfig::default());
//!
//!     let runner = session.clone();
//!     tokio::spawn(async move { runner.run().await });
//!
//!     let response = session.request(ChannelFrameType::Rpc, &b"{}"[..]).await?;
//!     println!("result code {}", response.result);
//!     Ok(())
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Client                                 Node
//!   |-------- Rpc (seq=s1) --------------->|
//!   |-------- Rpc (seq=s2) --------------->|
//!   |<------- Rpc (seq=s2) ----------------|   matched to waiter s2
//!   |<------- Rpc (seq=s1) ----------------|   matched to waiter s1
//!   |<------- TransactionBlockNumber ------|   push channel
//!   |-------- Heartbeat (seq=0) ---------->|
//! ```

pub mod error;
pub mod frame;
pub mod frame_type;
pub mod sequence;
pub mod session;
pub mod topic;
pub mod transport;

pub use error::{ChannelError, Result};
pub use frame::{limits, Frame, FrameCodec};
pub use frame_type::ChannelFrameType;
pub use sequence::{RandomSequence, Seq, SequenceGenerator};
pub use session::{ChannelConfig, ChannelSession};
pub use topic::{TopicMessage, TopicReport, MAX_TOPIC_LEN};
pub use transport::{memory::MemoryTransport, stream::StreamTransport, Transport};
