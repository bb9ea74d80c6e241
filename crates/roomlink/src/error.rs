//! Unified error type for the roomlink client.

use roomlink_protocol::ProtocolError;
use roomlink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Connection-level failures never surface here: they are reported to
/// subscribers as lifecycle events (`reconnecting`, `connection_failed`,
/// `message_failed`, `error`). Handle operations only fail with
/// [`ManagerStopped`](Self::ManagerStopped).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection manager task is gone.
    #[error("connection manager has stopped")]
    ManagerStopped,
}
