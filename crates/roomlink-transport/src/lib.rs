//! Transport abstraction layer for roomlink.
//!
//! Provides the [`Connector`] and [`Channel`] traits: the transport-open
//! primitive that turns a [`Destination`] into a live duplex channel, and
//! the channel itself. The connection core above never touches sockets
//! directly.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketChannel, WebSocketConnector};

use std::fmt;
use std::future::Future;

/// Opaque identifier of the remote session or room being connected to.
///
/// The core never interprets it; connectors map it to an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination(String);

impl Destination {
    /// Creates a destination from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the destination as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Destination {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque identifier for an opened channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Creates a new `ChannelId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chan-{}", self.0)
    }
}

/// Opens live duplex channels to destinations.
///
/// The returned futures must be `Send` because the connection core runs
/// handshakes in their own Tokio task so a teardown can abort them.
pub trait Connector: Send + Sync + 'static {
    /// The channel type produced by this connector.
    type Channel: Channel;
    /// The error type for open failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Performs the transport handshake and returns a live channel.
    fn open(
        &self,
        destination: &Destination,
    ) -> impl Future<Output = Result<Self::Channel, Self::Error>> + Send;
}

/// A single live channel that can send and receive bytes.
///
/// `send` and `recv` take `&self` and may run concurrently: one task
/// reads while another writes.
pub trait Channel: Send + Sync + 'static {
    /// The error type for channel operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one message to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the channel is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Closes the channel.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this channel.
    fn id(&self) -> ChannelId;
}
