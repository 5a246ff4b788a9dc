//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use bcos_client_channel::{
    ChannelConfig, ChannelFrameType, ChannelSession, Frame, MemoryTransport, RandomSequence,
    Transport,
};
use bcos_client_core::{Address, Header, HeaderBuilder, EMPTY_ROOT_HASH, EMPTY_UNCLE_HASH};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Build a linked chain of `len` headers starting at block 0.
///
/// Each header's `parent_hash` is the identity of the one before it.
pub fn header_chain(len: usize) -> Vec<Header> {
    let mut chain: Vec<Header> = Vec::with_capacity(len);
    for i in 0..len as u64 {
        let mut builder = HeaderBuilder::new()
            .uncle_hash(EMPTY_UNCLE_HASH)
            .coinbase(Address::from_bytes([0xcb; 20]))
            .state_root(EMPTY_ROOT_HASH)
            .transactions_root(EMPTY_ROOT_HASH)
            .receipts_root(EMPTY_ROOT_HASH)
            .number(i)
            .gas_limit(30_000_000)
            .timestamp(1_700_000_000 + i);
        if let Some(parent) = chain.last() {
            builder = builder.parent(parent);
        }
        chain.push(builder.build());
    }
    chain
}

/// A session wired to an in-memory node end.
pub struct SessionFixture {
    pub session: Arc<ChannelSession<MemoryTransport>>,
    pub pushes: mpsc::Receiver<Frame>,
    /// The node's end of the connection.
    pub node: MemoryTransport,
    pub receive_loop: JoinHandle<bcos_client_channel::Result<()>>,
}

impl SessionFixture {
    /// Start a session with default configuration. Requires a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    pub fn with_config(config: ChannelConfig) -> Self {
        let (local, node) = MemoryTransport::pair(64);
        let (session, pushes) = ChannelSession::new(local, RandomSequence::new(), config);
        let runner = Arc::clone(&session);
        let receive_loop = tokio::spawn(async move { runner.run().await });
        Self {
            session,
            pushes,
            node,
            receive_loop,
        }
    }
}

impl Default for SessionFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A session whose node end is an [`echo_node`].
pub struct EchoFixture {
    pub session: Arc<ChannelSession<MemoryTransport>>,
    pub pushes: mpsc::Receiver<Frame>,
    pub receive_loop: JoinHandle<bcos_client_channel::Result<()>>,
    pub echo: JoinHandle<usize>,
}

impl EchoFixture {
    /// Requires a Tokio runtime.
    pub fn new() -> Self {
        let SessionFixture {
            session,
            pushes,
            node,
            receive_loop,
        } = SessionFixture::new();
        let echo = tokio::spawn(echo_node(node));
        Self {
            session,
            pushes,
            receive_loop,
            echo,
        }
    }

    /// Close the session and return how many frames the node answered.
    pub async fn shutdown(self) -> usize {
        self.receive_loop.abort();
        let _ = self.receive_loop.await;
        drop(self.session);
        self.echo.await.unwrap_or(0)
    }
}

impl Default for EchoFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Answer every correlated frame with its own payload until the peer goes
/// away. Returns the number of frames answered.
pub async fn echo_node(node: MemoryTransport) -> usize {
    let mut answered = 0;
    while let Ok(frame) = node.recv().await {
        let kind = match frame.frame_type {
            ChannelFrameType::AmopRequest => ChannelFrameType::AmopResponse,
            ChannelFrameType::Rpc => ChannelFrameType::Rpc,
            _ => continue,
        };
        let payload: Bytes = frame.payload.clone();
        if node.send(frame.reply(kind, payload)).await.is_err() {
            break;
        }
        answered += 1;
    }
    answered
}
