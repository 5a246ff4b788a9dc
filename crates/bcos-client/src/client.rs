//! The client: a channel session plus its background receive loop.

use std::sync::Arc;

use bcos_client_channel::{
    ChannelFrameType, ChannelSession, Frame, RandomSequence, SequenceGenerator, Transport,
};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// A connected client.
///
/// Owns the task that drives [`ChannelSession::run`]. Must be created
/// inside a Tokio runtime.
pub struct Client<T, G = RandomSequence>
where
    T: Transport + 'static,
    G: SequenceGenerator + 'static,
{
    session: Arc<ChannelSession<T, G>>,
    receive_loop: JoinHandle<bcos_client_channel::Result<()>>,
}

impl<T: Transport + 'static> Client<T> {
    /// Start a client over `transport`.
    ///
    /// Returns the client and the receiver for frames the node pushes.
    pub fn connect(transport: T, config: &ClientConfig) -> Result<(Self, mpsc::Receiver<Frame>)> {
        Self::with_generator(transport, RandomSequence::new(), config)
    }
}

impl<T, G> Client<T, G>
where
    T: Transport + 'static,
    G: SequenceGenerator + 'static,
{
    pub fn with_generator(
        transport: T,
        generator: G,
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::Receiver<Frame>)> {
        config.validate()?;
        let (session, pushes) = ChannelSession::new(transport, generator, config.channel_config());

        let runner = Arc::clone(&session);
        let receive_loop = tokio::spawn(async move { runner.run().await });
        tracing::debug!("client receive loop started");

        Ok((
            Self {
                session,
                receive_loop,
            },
            pushes,
        ))
    }

    pub fn session(&self) -> &Arc<ChannelSession<T, G>> {
        &self.session
    }

    /// Send an RPC request and wait for its response.
    pub async fn call(&self, payload: impl Into<Bytes>) -> Result<Frame> {
        Ok(self.session.request(ChannelFrameType::Rpc, payload).await?)
    }

    /// Whether the receive loop has stopped, e.g. because the node hung up.
    pub fn is_closed(&self) -> bool {
        self.receive_loop.is_finished()
    }

    /// Stop the receive loop.
    ///
    /// Returns the loop's own error if it had already failed.
    pub async fn shutdown(self) -> Result<()> {
        self.receive_loop.abort();
        match self.receive_loop.await {
            Ok(outcome) => Ok(outcome?),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ClientError::Task(e.to_string())),
        }
    }
}
