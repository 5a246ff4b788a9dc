//! Client configuration.

use std::path::Path;
use std::time::Duration;

use bcos_client_channel::{limits, ChannelConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Configuration for the client, loadable from JSON.
///
/// Missing fields take their default values; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// How long a request waits for its response, in milliseconds.
    pub request_timeout_ms: u64,
    /// Upper bound on a whole frame in bytes.
    pub max_frame_len: usize,
    /// Capacity of the push channel.
    pub push_buffer: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            max_frame_len: limits::DEFAULT_MAX_FRAME_LEN,
            push_buffer: 256,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(ClientError::Config(
                "request_timeout_ms must be positive".into(),
            ));
        }
        if self.max_frame_len < limits::HEADER_LEN {
            return Err(ClientError::Config(format!(
                "max_frame_len {} is below the {}-byte frame header",
                self.max_frame_len,
                limits::HEADER_LEN
            )));
        }
        if self.push_buffer == 0 {
            return Err(ClientError::Config("push_buffer must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            request_timeout: self.request_timeout(),
            max_frame_len: self.max_frame_len,
            push_buffer: self.push_buffer,
        }
    }
}
