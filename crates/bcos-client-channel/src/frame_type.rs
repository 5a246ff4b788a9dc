//! Channel frame kinds.

use std::fmt;

use crate::error::{ChannelError, Result};

/// The closed set of frame kinds on the channel sub-protocol.
///
/// Tags are 16 bits wide on the wire. Decoding any other tag is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ChannelFrameType {
    /// Call request, and its response under the same sequence.
    Rpc = 0x12,
    /// Liveness ping; uses the zero sequence.
    Heartbeat = 0x13,
    /// Application messaging request.
    AmopRequest = 0x30,
    /// Application messaging response.
    AmopResponse = 0x31,
    /// Registration of the topics this client listens on.
    TopicReport = 0x32,
    /// One-to-many topic delivery; uses the zero sequence.
    TopicMulticast = 0x35,
    /// A submitted transaction was committed.
    TransactionCommitted = 0x1000,
    /// The node's block number advanced.
    TransactionBlockNumber = 0x1001,
}

impl ChannelFrameType {
    /// Every frame kind, in tag order.
    pub const ALL: [ChannelFrameType; 8] = [
        ChannelFrameType::Rpc,
        ChannelFrameType::Heartbeat,
        ChannelFrameType::AmopRequest,
        ChannelFrameType::AmopResponse,
        ChannelFrameType::TopicReport,
        ChannelFrameType::TopicMulticast,
        ChannelFrameType::TransactionCommitted,
        ChannelFrameType::TransactionBlockNumber,
    ];

    /// The wire tag.
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Decode a wire tag.
    pub fn from_u16(tag: u16) -> Result<Self> {
        match tag {
            0x12 => Ok(ChannelFrameType::Rpc),
            0x13 => Ok(ChannelFrameType::Heartbeat),
            0x30 => Ok(ChannelFrameType::AmopRequest),
            0x31 => Ok(ChannelFrameType::AmopResponse),
            0x32 => Ok(ChannelFrameType::TopicReport),
            0x35 => Ok(ChannelFrameType::TopicMulticast),
            0x1000 => Ok(ChannelFrameType::TransactionCommitted),
            0x1001 => Ok(ChannelFrameType::TransactionBlockNumber),
            other => Err(ChannelError::UnrecognizedFrameType(other)),
        }
    }

    /// Kinds sent with [`Seq::ZERO`](crate::Seq::ZERO) because no caller
    /// waits for a matched reply.
    pub const fn uses_zero_sequence(self) -> bool {
        matches!(
            self,
            ChannelFrameType::Heartbeat | ChannelFrameType::TopicMulticast
        )
    }

    /// Kinds the node sends unprompted.
    pub const fn is_push(self) -> bool {
        matches!(
            self,
            ChannelFrameType::AmopRequest
                | ChannelFrameType::TopicMulticast
                | ChannelFrameType::TransactionCommitted
                | ChannelFrameType::TransactionBlockNumber
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            ChannelFrameType::Rpc => "rpc",
            ChannelFrameType::Heartbeat => "heartbeat",
            ChannelFrameType::AmopRequest => "amop-request",
            ChannelFrameType::AmopResponse => "amop-response",
            ChannelFrameType::TopicReport => "topic-report",
            ChannelFrameType::TopicMulticast => "topic-multicast",
            ChannelFrameType::TransactionCommitted => "tx-committed",
            ChannelFrameType::TransactionBlockNumber => "tx-block-number",
        }
    }
}

impl TryFrom<u16> for ChannelFrameType {
    type Error = ChannelError;

    fn try_from(tag: u16) -> Result<Self> {
        Self::from_u16(tag)
    }
}

impl From<ChannelFrameType> for u16 {
    fn from(kind: ChannelFrameType) -> Self {
        kind.to_u16()
    }
}

impl fmt::Display for ChannelFrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#x})", self.name(), self.to_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_tag() {
        assert_eq!(
            ChannelFrameType::from_u16(0x13).unwrap(),
            ChannelFrameType::Heartbeat
        );
    }

    #[test]
    fn test_block_number_tag() {
        assert_eq!(
            ChannelFrameType::from_u16(0x1001).unwrap(),
            ChannelFrameType::TransactionBlockNumber
        );
    }

    #[test]
    fn test_unknown_tag_fails() {
        assert!(matches!(
            ChannelFrameType::from_u16(0x99),
            Err(ChannelError::UnrecognizedFrameType(0x99))
        ));
        assert!(ChannelFrameType::try_from(0u16).is_err());
        assert!(ChannelFrameType::try_from(0x1002u16).is_err());
    }

    #[test]
    fn test_tag_table() {
        let expected: [(ChannelFrameType, u16); 8] = [
            (ChannelFrameType::Rpc, 0x12),
            (ChannelFrameType::Heartbeat, 0x13),
            (ChannelFrameType::AmopRequest, 0x30),
            (ChannelFrameType::AmopResponse, 0x31),
            (ChannelFrameType::TopicReport, 0x32),
            (ChannelFrameType::TopicMulticast, 0x35),
            (ChannelFrameType::TransactionCommitted, 0x1000),
            (ChannelFrameType::TransactionBlockNumber, 0x1001),
        ];
        for (kind, tag) in expected {
            assert_eq!(kind.to_u16(), tag);
            assert_eq!(u16::from(kind), tag);
            assert_eq!(ChannelFrameType::from_u16(tag).unwrap(), kind);
        }
    }

    #[test]
    fn test_every_other_tag_is_rejected() {
        let known: Vec<u16> = ChannelFrameType::ALL.iter().map(|k| k.to_u16()).collect();
        for tag in 0..=u16::MAX {
            let decoded = ChannelFrameType::from_u16(tag);
            assert_eq!(decoded.is_ok(), known.contains(&tag), "tag {tag:#x}");
        }
    }

    #[test]
    fn test_zero_sequence_kinds() {
        let zero: Vec<_> = ChannelFrameType::ALL
            .into_iter()
            .filter(|k| k.uses_zero_sequence())
            .collect();
        assert_eq!(
            zero,
            vec![ChannelFrameType::Heartbeat, ChannelFrameType::TopicMulticast]
        );
    }
}
