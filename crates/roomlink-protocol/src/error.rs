//! Error types for the protocol layer.
//!
//! Each crate in roomlink defines its own error enum. A `ProtocolError`
//! always means serialization/deserialization went wrong, never
//! networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `event` field, or a
    /// truncated frame.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message parsed but violates protocol rules, e.g. an empty
    /// event name.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
