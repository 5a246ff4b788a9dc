//! Error types for the channel module.

use thiserror::Error;

use crate::frame_type::ChannelFrameType;

/// Errors that can occur on the channel sub-protocol.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The sequence source could not produce an identifier.
    #[error("sequence generation failed: {0}")]
    GenerationExhausted(String),

    /// A frame carried a type tag outside the known set.
    #[error("unrecognized frame type: {0:#x}")]
    UnrecognizedFrameType(u16),

    /// Frame length exceeds the configured maximum.
    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    /// Frame length is smaller than the fixed frame header.
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// Topic name is empty or too long.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// A correlated request was attempted on a kind that uses the reserved
    /// zero sequence.
    #[error("frame kind {0} uses the zero sequence and cannot be correlated")]
    ZeroSequenceKind(ChannelFrameType),

    /// Payload could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Timeout waiting for a response.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The connection or session is closed.
    #[error("channel closed")]
    Closed,
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ChannelError {
    fn from(e: std::io::Error) -> Self {
        ChannelError::Transport(e.to_string())
    }
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
