//! WebSocket client transport using `tokio-tungstenite`.
//!
//! [`WebSocketConnector`] performs the HTTP upgrade handshake and hands back
//! a [`WebSocketChannel`]. The channel is the only place in the workspace
//! that knows about WebSocket frames: everything above it deals in plain
//! byte buffers.
//!
//! ## Why split the socket?
//!
//! A `WebSocketStream` is both a `Sink` (outgoing frames) and a `Stream`
//! (incoming frames). Behind a single mutex, the reader task parked in
//! `recv` would hold the lock for as long as the server stays quiet, and
//! every `send` would wait behind it. `StreamExt::split` gives two halves
//! that can be locked independently, so reads and writes never block each
//! other.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Channel, ChannelId, Connector, Destination, TransportError};

/// Counter for generating unique channel IDs.
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Connector`] that dials `"{base_url}/{destination}"` over WebSocket.
///
/// Cheap to clone; it holds nothing but the base URL. Both `ws://` and
/// `wss://` URLs are accepted, since `connect_async` picks the stream type
/// from the scheme (hence [`MaybeTlsStream`]).
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    base_url: String,
}

impl WebSocketConnector {
    /// Creates a connector rooted at `base_url` (e.g. `ws://host:8080/rooms`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Builds the URL dialed for `destination`.
    pub fn url_for(&self, destination: &Destination) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            destination.as_str()
        )
    }
}

impl Connector for WebSocketConnector {
    type Channel = WebSocketChannel;
    type Error = TransportError;

    async fn open(
        &self,
        destination: &Destination,
    ) -> Result<Self::Channel, Self::Error> {
        let url = self.url_for(destination);
        let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed {
                destination: destination.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ),
            })?;

        let id =
            ChannelId::new(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %url, "opened WebSocket channel");

        // The upgrade response (status, headers) is not needed after this.
        let (sink, stream) = ws.split();
        Ok(WebSocketChannel {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// A single client-side WebSocket channel.
///
/// The socket is split so a pending `recv` never holds up a `send`.
/// Each half sits behind a `tokio::sync::Mutex` (not `std::sync::Mutex`)
/// because the lock is held across `.await` points.
pub struct WebSocketChannel {
    id: ChannelId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Channel for WebSocketChannel {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        // Envelopes are JSON, so they travel as text frames.
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                // A close frame and the end of the stream both mean the
                // server is done with us: report a clean close.
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // tungstenite answers protocol-level pings itself.
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        // Closing the sink sends a close frame and flushes it.
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ChannelId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_base_and_destination() {
        let connector = WebSocketConnector::new("ws://127.0.0.1:8080/rooms/");
        assert_eq!(
            connector.url_for(&Destination::new("ABCD")),
            "ws://127.0.0.1:8080/rooms/ABCD"
        );
    }
}
