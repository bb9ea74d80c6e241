/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening a channel to the destination failed (DNS, TCP, or the
    /// WebSocket upgrade was rejected).
    #[error("connect to {destination} failed: {source}")]
    ConnectFailed {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// An operation did not complete within its deadline.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
