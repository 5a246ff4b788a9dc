//! Transport abstraction for channel frames.
//!
//! The transport moves whole frames. TLS, node discovery and reconnects are
//! the caller's concern; anything that can carry bytes in order can be
//! wrapped with [`stream::StreamTransport`].

use async_trait::async_trait;

use crate::error::Result;
use crate::frame::Frame;

/// Frame transport to a single node.
///
/// Implementations must be thread-safe (Send + Sync). `recv` is called
/// from one receive loop at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame.
    async fn send(&self, frame: Frame) -> Result<()>;

    /// Receive the next frame.
    ///
    /// Returns [`ChannelError::Closed`](crate::ChannelError::Closed) once
    /// the peer is gone.
    async fn recv(&self) -> Result<Frame>;
}

/// In-process transport for tests and loopback use.
pub mod memory {
    use super::*;
    use crate::error::ChannelError;
    use tokio::sync::{mpsc, Mutex};

    /// One end of an in-memory frame pipe.
    pub struct MemoryTransport {
        tx: mpsc::Sender<Frame>,
        rx: Mutex<mpsc::Receiver<Frame>>,
    }

    impl MemoryTransport {
        /// Two connected ends; each buffers up to `capacity` frames.
        pub fn pair(capacity: usize) -> (Self, Self) {
            let (a_tx, a_rx) = mpsc::channel(capacity);
            let (b_tx, b_rx) = mpsc::channel(capacity);
            (
                Self {
                    tx: a_tx,
                    rx: Mutex::new(b_rx),
                },
                Self {
                    tx: b_tx,
                    rx: Mutex::new(a_rx),
                },
            )
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn send(&self, frame: Frame) -> Result<()> {
            self.tx.send(frame).await.map_err(|_| ChannelError::Closed)
        }

        async fn recv(&self) -> Result<Frame> {
            let mut rx = self.rx.lock().await;
            rx.recv().await.ok_or(ChannelError::Closed)
        }
    }
}

/// Transport over any ordered byte stream.
pub mod stream {
    use super::*;
    use crate::error::ChannelError;
    use crate::frame::FrameCodec;
    use bytes::BytesMut;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
    use tokio::sync::Mutex;

    struct ReadHalf<R> {
        io: R,
        buf: BytesMut,
    }

    /// Frames over a split reader and writer, e.g. the halves of a TCP or
    /// TLS stream.
    pub struct StreamTransport<R, W> {
        codec: FrameCodec,
        reader: Mutex<ReadHalf<R>>,
        writer: Mutex<W>,
    }

    impl<R, W> StreamTransport<R, W>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        pub fn new(reader: R, writer: W, codec: FrameCodec) -> Self {
            Self {
                codec,
                reader: Mutex::new(ReadHalf {
                    io: reader,
                    buf: BytesMut::with_capacity(8 * 1024),
                }),
                writer: Mutex::new(writer),
            }
        }
    }

    #[async_trait]
    impl<R, W> Transport for StreamTransport<R, W>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        async fn send(&self, frame: Frame) -> Result<()> {
            let mut buf = BytesMut::with_capacity(frame.encoded_len());
            self.codec.encode(&frame, &mut buf)?;
            let mut writer = self.writer.lock().await;
            writer.write_all(&buf).await?;
            writer.flush().await?;
            Ok(())
        }

        async fn recv(&self) -> Result<Frame> {
            let mut half = self.reader.lock().await;
            let ReadHalf { io, buf } = &mut *half;
            loop {
                if let Some(frame) = self.codec.decode(buf)? {
                    return Ok(frame);
                }
                let n = io.read_buf(buf).await?;
                if n == 0 {
                    if !buf.is_empty() {
                        tracing::warn!(buffered = buf.len(), "stream closed mid-frame");
                    }
                    return Err(ChannelError::Closed);
                }
            }
        }
    }
}
