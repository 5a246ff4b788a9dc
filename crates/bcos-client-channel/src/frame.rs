//! Channel frames and their wire codec.
//!
//! Wire layout, all integers big-endian:
//!
//! ```text
//! | length: u32 | type: u16 | seq: 16 bytes | result: i32 | payload ... |
//! ```
//!
//! `length` counts the whole frame, header included.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ChannelError, Result};
use crate::frame_type::ChannelFrameType;
use crate::sequence::Seq;

/// Frame size limits.
pub mod limits {
    /// length (4) + type (2) + seq (16) + result (4).
    pub const HEADER_LEN: usize = 26;
    /// Default upper bound on a whole frame.
    pub const DEFAULT_MAX_FRAME_LEN: usize = 10 * 1024 * 1024;
}

/// One unit of the channel sub-protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: ChannelFrameType,
    pub seq: Seq,
    /// Status code set by the node on responses; zero on requests.
    pub result: i32,
    pub payload: Bytes,
}

impl Frame {
    /// A frame with a zero result code.
    pub fn new(frame_type: ChannelFrameType, seq: Seq, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_type,
            seq,
            result: 0,
            payload: payload.into(),
        }
    }

    pub fn with_result(mut self, result: i32) -> Self {
        self.result = result;
        self
    }

    /// A frame of `frame_type` correlated to this one.
    pub fn reply(&self, frame_type: ChannelFrameType, payload: impl Into<Bytes>) -> Self {
        Frame::new(frame_type, self.seq, payload)
    }

    /// Size of the frame on the wire.
    pub fn encoded_len(&self) -> usize {
        limits::HEADER_LEN + self.payload.len()
    }

    /// Append the wire form to `dst`.
    pub fn encode_to(&self, dst: &mut BytesMut) -> Result<()> {
        let len = self.encoded_len();
        let wire_len = u32::try_from(len).map_err(|_| ChannelError::FrameTooLarge {
            len,
            max: u32::MAX as usize,
        })?;
        dst.reserve(len);
        dst.put_u32(wire_len);
        dst.put_u16(self.frame_type.to_u16());
        dst.put_slice(self.seq.as_bytes());
        dst.put_i32(self.result);
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// The wire form as a standalone buffer.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_to(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Length-delimited frame codec with a size cap.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Encode a frame, refusing ones over the cap.
    pub fn encode(&self, frame: &Frame, dst: &mut BytesMut) -> Result<()> {
        let len = frame.encoded_len();
        if len > self.max_frame_len {
            return Err(ChannelError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }
        frame.encode_to(dst)
    }

    /// Take the next complete frame out of `src`.
    ///
    /// Returns `Ok(None)` while the buffer holds only part of a frame. A
    /// frame with an unrecognized type is consumed and reported as an
    /// error, so the stream stays aligned on the following frame. A length
    /// outside `HEADER_LEN..=max_frame_len` leaves the buffer untouched; the
    /// stream cannot be resynchronized after that.
    pub fn decode(&self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.len() < 4 {
            return Ok(None);
        }
        let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if len < limits::HEADER_LEN {
            return Err(ChannelError::FrameTooShort(len));
        }
        if len > self.max_frame_len {
            return Err(ChannelError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }
        if src.len() < len {
            src.reserve(len - src.len());
            return Ok(None);
        }

        let mut raw = src.split_to(len);
        raw.advance(4);
        let tag = raw.get_u16();
        let mut seq = [0u8; Seq::LEN];
        raw.copy_to_slice(&mut seq);
        let result = raw.get_i32();
        let payload = raw.freeze();

        let frame_type = ChannelFrameType::from_u16(tag)?;
        Ok(Some(Frame {
            frame_type,
            seq: Seq(seq),
            result,
            payload,
        }))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(limits::DEFAULT_MAX_FRAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame::new(
            ChannelFrameType::Rpc,
            Seq::from_bytes([0x01; 16]),
            Bytes::from_static(b"{\"id\":1}"),
        )
    }

    #[test]
    fn test_encode_layout() {
        let frame = sample_frame().with_result(-1);
        let bytes = frame.encode().unwrap();

        assert_eq!(bytes.len(), 26 + 8);
        assert_eq!(&bytes[..4], &34u32.to_be_bytes());
        assert_eq!(&bytes[4..6], &[0x00, 0x12]);
        assert_eq!(&bytes[6..22], &[0x01; 16]);
        assert_eq!(&bytes[22..26], &(-1i32).to_be_bytes());
        assert_eq!(&bytes[26..], b"{\"id\":1}");
    }

    #[test]
    fn test_wide_tag_on_wire() {
        let frame = Frame::new(ChannelFrameType::TransactionCommitted, Seq::ZERO, Bytes::new());
        let bytes = frame.encode().unwrap();
        assert_eq!(&bytes[4..6], &[0x10, 0x00]);
    }

    #[test]
    fn test_decode_encoded_frame() {
        let codec = FrameCodec::default();
        let frame = sample_frame();
        let mut buf = BytesMut::new();
        codec.encode(&frame, &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_waits_for_full_frame() {
        let codec = FrameCodec::default();
        let encoded = sample_frame().encode().unwrap();

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encoded[..3]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&encoded[3..20]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&encoded[20..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), sample_frame());
    }

    #[test]
    fn test_decode_two_frames_back_to_back() {
        let codec = FrameCodec::default();
        let first = sample_frame();
        let second = Frame::new(ChannelFrameType::Heartbeat, Seq::ZERO, Bytes::new());

        let mut buf = BytesMut::new();
        codec.encode(&first, &mut buf).unwrap();
        codec.encode(&second, &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), first);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), second);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_unknown_type_is_discarded() {
        let codec = FrameCodec::default();
        let mut bad = BytesMut::from(&sample_frame().encode().unwrap()[..]);
        bad[4] = 0x00;
        bad[5] = 0x99;

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&bad);
        codec.encode(&sample_frame(), &mut buf).unwrap();

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ChannelError::UnrecognizedFrameType(0x99))
        ));
        // The following frame is still readable.
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), sample_frame());
    }

    #[test]
    fn test_length_bounds() {
        let codec = FrameCodec::new(64);

        let mut short = BytesMut::new();
        short.put_u32(10);
        assert!(matches!(
            codec.decode(&mut short),
            Err(ChannelError::FrameTooShort(10))
        ));

        let mut long = BytesMut::new();
        long.put_u32(65);
        assert!(matches!(
            codec.decode(&mut long),
            Err(ChannelError::FrameTooLarge { len: 65, max: 64 })
        ));

        let big = Frame::new(ChannelFrameType::Rpc, Seq::ZERO, vec![0u8; 64]);
        assert!(codec.encode(&big, &mut BytesMut::new()).is_err());
    }

    #[test]
    fn test_reply_keeps_sequence() {
        let request = sample_frame();
        let reply = request.reply(ChannelFrameType::Rpc, Bytes::from_static(b"ok"));
        assert_eq!(reply.seq, request.seq);
        assert_eq!(reply.result, 0);
    }
}
