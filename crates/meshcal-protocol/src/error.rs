//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to serialize or deserialize a message.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid protocol version in an envelope.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    /// An entity canon string did not have the `zone/base/name` shape.
    #[error("malformed entity canon: {0:?}")]
    MalformedCanon(String),
}
