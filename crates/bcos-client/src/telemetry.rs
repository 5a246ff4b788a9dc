//! Logging setup.

use tracing_subscriber::EnvFilter;

use crate::error::{ClientError, Result};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `filter` when it is set. Fails if a
/// global subscriber is already installed.
pub fn init_tracing(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| ClientError::Config(format!("log filter {filter:?}: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ClientError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("debug");
        assert!(matches!(init_tracing("debug"), Err(ClientError::Config(_))));
    }
}
