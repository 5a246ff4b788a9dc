//! Error types for the client.

use bcos_client_channel::ChannelError;
use bcos_client_core::CoreError;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Encoding, decoding or field validation error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Channel sub-protocol error.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The background receive loop panicked.
    #[error("receive loop failed: {0}")]
    Task(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
