//! Channel session: request/response correlation over one transport.
//!
//! Every correlated request registers a waiter under a fresh sequence before
//! it is sent. The receive loop ([`ChannelSession::run`]) completes the
//! waiter whose sequence matches an incoming frame and routes everything
//! else to the push channel returned by [`ChannelSession::new`]. A full push
//! channel drops the frame rather than stalling responses queued behind it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::error::{ChannelError, Result};
use crate::frame::{limits, Frame};
use crate::frame_type::ChannelFrameType;
use crate::sequence::{RandomSequence, Seq, SequenceGenerator};
use crate::topic::{TopicMessage, TopicReport};
use crate::transport::Transport;

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// How long a correlated request waits for its response.
    pub request_timeout: Duration,
    /// Upper bound on a whole outgoing frame, header included.
    pub max_frame_len: usize,
    /// Capacity of the push channel.
    pub push_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_frame_len: limits::DEFAULT_MAX_FRAME_LEN,
            push_buffer: 256,
        }
    }
}

/// A multiplexed session with one node.
pub struct ChannelSession<T: Transport, G: SequenceGenerator = RandomSequence> {
    transport: T,
    generator: G,
    config: ChannelConfig,
    /// Waiters keyed by the sequence of their outstanding request.
    pending: Mutex<HashMap<Seq, oneshot::Sender<Frame>>>,
    pushes: mpsc::Sender<Frame>,
    /// Set under the `pending` lock once the receive loop has ended.
    closed: AtomicBool,
}

impl<T: Transport, G: SequenceGenerator> ChannelSession<T, G> {
    /// Create a session and the receiver for unsolicited frames.
    pub fn new(
        transport: T,
        generator: G,
        config: ChannelConfig,
    ) -> (Arc<Self>, mpsc::Receiver<Frame>) {
        let (pushes, push_rx) = mpsc::channel(config.push_buffer.max(1));
        let session = Arc::new(Self {
            transport,
            generator,
            config,
            pending: Mutex::new(HashMap::new()),
            pushes,
            closed: AtomicBool::new(false),
        });
        (session, push_rx)
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// True once [`run`](Self::run) has returned.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn send_frame(&self, frame: Frame) -> Result<()> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        let len = frame.encoded_len();
        if len > self.config.max_frame_len {
            return Err(ChannelError::FrameTooLarge {
                len,
                max: self.config.max_frame_len,
            });
        }
        self.transport.send(frame).await
    }

    /// Send a correlated request and wait for the frame that answers it.
    ///
    /// The response may be of a different kind (an AMOP request is answered
    /// by an AMOP response); only the sequence is matched.
    pub async fn request(&self, kind: ChannelFrameType, payload: impl Into<Bytes>) -> Result<Frame> {
        if kind.uses_zero_sequence() {
            return Err(ChannelError::ZeroSequenceKind(kind));
        }
        let seq = self.generator.next()?;
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if self.is_closed() {
                return Err(ChannelError::Closed);
            }
            pending.insert(seq, tx);
        }

        tracing::debug!(%kind, %seq, "sending request");
        if let Err(e) = self.send_frame(Frame::new(kind, seq, payload)).await {
            self.pending.lock().await.remove(&seq);
            return Err(e);
        }

        match tokio::time::timeout(self.config.request_timeout, rx).await {
            Ok(Ok(frame)) => Ok(frame),
            // Waiter dropped by the receive loop on shutdown.
            Ok(Err(_)) => Err(ChannelError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&seq);
                tracing::warn!(%kind, %seq, "request timed out");
                Err(ChannelError::Timeout(format!(
                    "no response to {kind} {seq} within {:?}",
                    self.config.request_timeout
                )))
            }
        }
    }

    /// Send without waiting for a response.
    ///
    /// Returns the sequence the frame was sent under.
    pub async fn send(&self, kind: ChannelFrameType, payload: impl Into<Bytes>) -> Result<Seq> {
        let seq = if kind.uses_zero_sequence() {
            self.generator.zero()
        } else {
            self.generator.next()?
        };
        self.send_frame(Frame::new(kind, seq, payload)).await?;
        Ok(seq)
    }

    pub async fn heartbeat(&self) -> Result<()> {
        self.send(ChannelFrameType::Heartbeat, Bytes::new()).await?;
        Ok(())
    }

    /// Register the topics this client listens on.
    pub async fn subscribe<I, S>(&self, topics: I) -> Result<Seq>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let report = TopicReport::new(topics)?;
        self.send(ChannelFrameType::TopicReport, report.encode()?).await
    }

    /// Deliver `data` to every subscriber of `topic`.
    pub async fn multicast(&self, topic: &str, data: impl Into<Bytes>) -> Result<()> {
        let message = TopicMessage::new(topic, data)?;
        self.send(ChannelFrameType::TopicMulticast, message.encode())
            .await?;
        Ok(())
    }

    /// Deliver `data` to one subscriber of `topic` and wait for its answer.
    pub async fn publish(&self, topic: &str, data: impl Into<Bytes>) -> Result<Frame> {
        let message = TopicMessage::new(topic, data)?;
        self.request(ChannelFrameType::AmopRequest, message.encode())
            .await
    }

    /// Answer a frame received on the push channel.
    pub async fn respond(
        &self,
        to: &Frame,
        kind: ChannelFrameType,
        payload: impl Into<Bytes>,
    ) -> Result<()> {
        self.send_frame(to.reply(kind, payload)).await
    }

    /// Route one incoming frame.
    pub async fn dispatch(&self, frame: Frame) {
        if !frame.seq.is_zero() {
            let waiter = self.pending.lock().await.remove(&frame.seq);
            if let Some(tx) = waiter {
                tracing::debug!(kind = %frame.frame_type, seq = %frame.seq, "response matched");
                if tx.send(frame).is_err() {
                    tracing::debug!("waiter dropped before response arrived");
                }
                return;
            }
        }

        if frame.frame_type == ChannelFrameType::Heartbeat {
            tracing::debug!("heartbeat received");
            return;
        }

        if !frame.frame_type.is_push() {
            tracing::warn!(
                kind = %frame.frame_type,
                seq = %frame.seq,
                "unmatched response, routing to push channel"
            );
        }
        match self.pushes.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                tracing::warn!(kind = %frame.frame_type, "push channel full, frame dropped");
            }
            Err(TrySendError::Closed(frame)) => {
                tracing::warn!(kind = %frame.frame_type, "push receiver dropped, frame discarded");
            }
        }
    }

    /// Receive and dispatch frames until the transport closes.
    ///
    /// Outstanding requests fail with [`ChannelError::Closed`] when the loop
    /// ends, and so does every later send. Frames of an unrecognized kind are
    /// logged and skipped.
    pub async fn run(&self) -> Result<()> {
        let outcome = loop {
            match self.transport.recv().await {
                Ok(frame) => self.dispatch(frame).await,
                Err(ChannelError::UnrecognizedFrameType(tag)) => {
                    tracing::warn!(tag = format_args!("{tag:#x}"), "skipping unrecognized frame");
                }
                Err(ChannelError::Closed) => {
                    tracing::debug!("transport closed");
                    break Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "receive loop failed");
                    break Err(e);
                }
            }
        };
        let mut pending = self.pending.lock().await;
        self.closed.store(true, Ordering::Release);
        pending.clear();
        outcome
    }

    /// Number of requests still waiting for a response.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameCodec;
    use crate::transport::memory::MemoryTransport;
    use crate::transport::stream::StreamTransport;
    use tokio::io::AsyncWriteExt;

    type Session = ChannelSession<MemoryTransport>;

    fn session_with(config: ChannelConfig) -> (Arc<Session>, mpsc::Receiver<Frame>, MemoryTransport) {
        let (local, node) = MemoryTransport::pair(64);
        let (session, pushes) = ChannelSession::new(local, RandomSequence::new(), config);
        let runner = Arc::clone(&session);
        tokio::spawn(async move { runner.run().await });
        (session, pushes, node)
    }

    fn session() -> (Arc<Session>, mpsc::Receiver<Frame>, MemoryTransport) {
        session_with(ChannelConfig::default())
    }

    #[tokio::test]
    async fn test_request_response_correlation() {
        let (session, _pushes, node) = session();

        let node_task = tokio::spawn(async move {
            let request = node.recv().await.unwrap();
            assert_eq!(request.frame_type, ChannelFrameType::Rpc);
            assert!(!request.seq.is_zero());
            node.send(request.reply(ChannelFrameType::Rpc, Bytes::from_static(b"pong")))
                .await
                .unwrap();
            node
        });

        let response = session
            .request(ChannelFrameType::Rpc, Bytes::from_static(b"ping"))
            .await
            .unwrap();
        assert_eq!(&response.payload[..], b"pong");
        assert_eq!(session.pending_count().await, 0);
        node_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_responses_out_of_order() {
        let (session, _pushes, node) = session();

        tokio::spawn(async move {
            let first = node.recv().await.unwrap();
            let second = node.recv().await.unwrap();
            for request in [second, first] {
                let echo = request.payload.clone();
                node.send(request.reply(ChannelFrameType::Rpc, echo))
                    .await
                    .unwrap();
            }
            node
        });

        let (a, b) = tokio::join!(
            session.request(ChannelFrameType::Rpc, Bytes::from_static(b"a")),
            session.request(ChannelFrameType::Rpc, Bytes::from_static(b"b")),
        );
        assert_eq!(&a.unwrap().payload[..], b"a");
        assert_eq!(&b.unwrap().payload[..], b"b");
    }

    #[tokio::test]
    async fn test_timeout_removes_waiter() {
        let config = ChannelConfig {
            request_timeout: Duration::from_millis(50),
            ..ChannelConfig::default()
        };
        let (session, _pushes, _node) = session_with(config);

        let result = session.request(ChannelFrameType::Rpc, Bytes::new()).await;
        assert!(matches!(result, Err(ChannelError::Timeout(_))));
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_push_routing() {
        let (_session, mut pushes, node) = session();

        node.send(Frame::new(ChannelFrameType::Heartbeat, Seq::ZERO, Bytes::new()))
            .await
            .unwrap();
        let block = Frame::new(
            ChannelFrameType::TransactionBlockNumber,
            Seq::ZERO,
            Bytes::from_static(b"{\"blockNumber\":7}"),
        );
        node.send(block.clone()).await.unwrap();

        // The heartbeat is consumed by the session, not forwarded.
        assert_eq!(pushes.recv().await.unwrap(), block);
    }

    #[tokio::test]
    async fn test_unmatched_sequence_is_pushed() {
        let (_session, mut pushes, node) = session();

        let stray = Frame::new(
            ChannelFrameType::TransactionCommitted,
            Seq::from_bytes([9; 16]),
            Bytes::from_static(b"receipt"),
        );
        node.send(stray.clone()).await.unwrap();
        assert_eq!(pushes.recv().await.unwrap(), stray);
    }

    #[tokio::test]
    async fn test_zero_sequence_kinds() {
        let (session, _pushes, node) = session();

        assert!(matches!(
            session.request(ChannelFrameType::Heartbeat, Bytes::new()).await,
            Err(ChannelError::ZeroSequenceKind(ChannelFrameType::Heartbeat))
        ));
        assert!(matches!(
            session.request(ChannelFrameType::TopicMulticast, Bytes::new()).await,
            Err(ChannelError::ZeroSequenceKind(_))
        ));

        session.heartbeat().await.unwrap();
        let beat = node.recv().await.unwrap();
        assert_eq!(beat.frame_type, ChannelFrameType::Heartbeat);
        assert!(beat.seq.is_zero());

        let seq = session.send(ChannelFrameType::Rpc, Bytes::new()).await.unwrap();
        assert!(!seq.is_zero());
        assert_eq!(node.recv().await.unwrap().seq, seq);
    }

    #[tokio::test]
    async fn test_topic_frames() {
        let (session, _pushes, node) = session();

        session.subscribe(["news", "prices"]).await.unwrap();
        let report = node.recv().await.unwrap();
        assert_eq!(report.frame_type, ChannelFrameType::TopicReport);
        assert_eq!(&report.payload[..], br#"["news","prices"]"#);

        session.multicast("news", Bytes::from_static(b"hello")).await.unwrap();
        let multicast = node.recv().await.unwrap();
        assert_eq!(multicast.frame_type, ChannelFrameType::TopicMulticast);
        assert!(multicast.seq.is_zero());
        let message = TopicMessage::decode(&multicast.payload).unwrap();
        assert_eq!(message.topic(), "news");
        assert_eq!(&message.data()[..], b"hello");

        assert!(session.multicast("", Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_publish_awaits_amop_response() {
        let (session, _pushes, node) = session();

        tokio::spawn(async move {
            let request = node.recv().await.unwrap();
            assert_eq!(request.frame_type, ChannelFrameType::AmopRequest);
            let message = TopicMessage::decode(&request.payload).unwrap();
            assert_eq!(message.topic(), "orders");
            node.send(request.reply(ChannelFrameType::AmopResponse, Bytes::from_static(b"ack")))
                .await
                .unwrap();
            node
        });

        let response = session
            .publish("orders", Bytes::from_static(b"buy"))
            .await
            .unwrap();
        assert_eq!(response.frame_type, ChannelFrameType::AmopResponse);
        assert_eq!(&response.payload[..], b"ack");
    }

    #[tokio::test]
    async fn test_respond_to_pushed_request() {
        let (session, mut pushes, node) = session();

        let incoming = Frame::new(
            ChannelFrameType::AmopRequest,
            Seq::from_bytes([3; 16]),
            TopicMessage::new("orders", Bytes::from_static(b"sell"))
                .unwrap()
                .encode(),
        );
        node.send(incoming.clone()).await.unwrap();

        let pushed = pushes.recv().await.unwrap();
        session
            .respond(&pushed, ChannelFrameType::AmopResponse, Bytes::from_static(b"ok"))
            .await
            .unwrap();

        let reply = node.recv().await.unwrap();
        assert_eq!(reply.frame_type, ChannelFrameType::AmopResponse);
        assert_eq!(reply.seq, incoming.seq);
    }

    #[tokio::test]
    async fn test_close_fails_outstanding_requests() {
        let (session, _pushes, node) = session();

        tokio::spawn(async move {
            let _request = node.recv().await.unwrap();
            drop(node);
        });

        let result = session.request(ChannelFrameType::Rpc, Bytes::new()).await;
        assert!(matches!(result, Err(ChannelError::Closed)));
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_run_skips_unrecognized_frames() {
        let (mut raw, local) = tokio::io::duplex(1024);
        let (r, w) = tokio::io::split(local);
        let transport = StreamTransport::new(r, w, FrameCodec::default());
        let (session, mut pushes) =
            ChannelSession::new(transport, RandomSequence::new(), ChannelConfig::default());
        let runner = Arc::clone(&session);
        let run = tokio::spawn(async move { runner.run().await });

        let push = Frame::new(
            ChannelFrameType::TransactionBlockNumber,
            Seq::ZERO,
            Bytes::from_static(b"8"),
        );
        let mut unknown = push.encode().unwrap().to_vec();
        unknown[4] = 0x00;
        unknown[5] = 0x99;
        raw.write_all(&unknown).await.unwrap();
        raw.write_all(&push.encode().unwrap()).await.unwrap();

        assert_eq!(pushes.recv().await.unwrap(), push);
        drop(raw);
        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let config = ChannelConfig {
            max_frame_len: 64,
            ..ChannelConfig::default()
        };
        let (session, _pushes, node) = session_with(config);
        let big = Bytes::from(vec![0u8; 4096]);

        assert!(matches!(
            session.send(ChannelFrameType::Rpc, big.clone()).await,
            Err(ChannelError::FrameTooLarge { len: 4122, max: 64 })
        ));
        assert!(matches!(
            session.request(ChannelFrameType::Rpc, big.clone()).await,
            Err(ChannelError::FrameTooLarge { .. })
        ));
        assert_eq!(session.pending_count().await, 0);

        let incoming = Frame::new(ChannelFrameType::AmopRequest, Seq::from_bytes([5; 16]), Bytes::new());
        assert!(matches!(
            session.respond(&incoming, ChannelFrameType::AmopResponse, big).await,
            Err(ChannelError::FrameTooLarge { .. })
        ));

        // A frame exactly at the limit still goes out, and is the first the node sees.
        session
            .send(ChannelFrameType::Rpc, vec![0u8; 64 - limits::HEADER_LEN])
            .await
            .unwrap();
        assert_eq!(node.recv().await.unwrap().encoded_len(), 64);
    }

    #[tokio::test]
    async fn test_full_push_channel_does_not_block_responses() {
        let config = ChannelConfig {
            push_buffer: 1,
            ..ChannelConfig::default()
        };
        let (session, mut pushes, node) = session_with(config);

        let block = |n: &'static [u8]| {
            Frame::new(ChannelFrameType::TransactionBlockNumber, Seq::ZERO, Bytes::from_static(n))
        };
        tokio::spawn(async move {
            let request = node.recv().await.unwrap();
            node.send(block(b"1")).await.unwrap();
            node.send(block(b"2")).await.unwrap();
            node.send(request.reply(ChannelFrameType::Rpc, Bytes::from_static(b"pong")))
                .await
                .unwrap();
            node
        });

        // Nobody reads the push channel until the response is in.
        let response = tokio::time::timeout(
            Duration::from_secs(1),
            session.request(ChannelFrameType::Rpc, Bytes::from_static(b"ping")),
        )
        .await
        .expect("response stalled behind unread pushes")
        .unwrap();
        assert_eq!(&response.payload[..], b"pong");

        assert_eq!(pushes.recv().await.unwrap(), block(b"1"));
        assert!(pushes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_request_after_close_fails_fast() {
        // Inbound side at EOF, outbound side still writable.
        let (inbound, peer_in) = tokio::io::duplex(64);
        let (outbound, _peer_out) = tokio::io::duplex(1024);
        drop(peer_in);
        let transport = StreamTransport::new(inbound, outbound, FrameCodec::default());
        let (session, _pushes) =
            ChannelSession::new(transport, RandomSequence::new(), ChannelConfig::default());

        assert!(!session.is_closed());
        session.run().await.unwrap();
        assert!(session.is_closed());

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            session.request(ChannelFrameType::Rpc, Bytes::new()),
        )
        .await
        .expect("request after close waited for its timeout");
        assert!(matches!(result, Err(ChannelError::Closed)));
        assert_eq!(session.pending_count().await, 0);
        assert!(matches!(
            session.send(ChannelFrameType::Rpc, Bytes::new()).await,
            Err(ChannelError::Closed)
        ));
    }
}
