//! Error types for the BCOS client core.

use thiserror::Error;

/// Errors raised while building, encoding or decoding core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A value violates the shape or range contract of the field it is
    /// destined for. Nothing is encoded when this is returned.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Canonical bytes could not be decoded.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A textual hex value could not be parsed.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl CoreError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Re-label an error with the header field it was raised for.
    pub(crate) fn for_field(self, field: &'static str) -> Self {
        match self {
            CoreError::InvalidField { reason, .. } => CoreError::InvalidField { field, reason },
            CoreError::MalformedEncoding(reason) | CoreError::InvalidHex(reason) => {
                CoreError::InvalidField { field, reason }
            }
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
