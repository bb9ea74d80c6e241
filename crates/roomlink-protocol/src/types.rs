//! Core protocol types for roomlink's wire format.
//!
//! Every message that crosses the channel, in either direction, is an
//! [`Envelope`]: an event name plus an arbitrary JSON payload. This module
//! also defines the reserved event names the connection core speaks on its
//! own behalf, and the payload shapes of the lifecycle events it emits to
//! local subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level message wrapper. Every message on the wire is an Envelope.
///
/// ```text
/// { "event": "move", "data": { "row": 1, "col": 2 } }
/// ```
///
/// `data` is opaque to the connection core: it is never inspected, only
/// carried. A missing `data` field decodes as `null`; a missing `event`
/// field is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Application-level event name.
    pub event: String,

    /// Arbitrary structured payload.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Creates an envelope from an event name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Returns `true` if this envelope uses one of the names the
    /// connection core reserves for itself.
    pub fn is_reserved(&self) -> bool {
        reserved::is_reserved(&self.event)
    }
}

// ---------------------------------------------------------------------------
// Reserved wire events
// ---------------------------------------------------------------------------

/// Event names the connection core sends or consumes on its own behalf.
pub mod reserved {
    /// Sent once on every transition into `Open`, carrying the destination
    /// identifier so the peer can resume session-scoped context.
    pub const CLIENT_READY: &str = "client_ready";

    /// Liveness probe. Sent by the monitor; answered with [`PONG`].
    pub const PING: &str = "ping";

    /// Liveness probe reply.
    pub const PONG: &str = "pong";

    /// Returns `true` for any reserved name.
    pub fn is_reserved(event: &str) -> bool {
        matches!(event, CLIENT_READY | PING | PONG)
    }
}

/// Payload of [`reserved::PING`] / [`reserved::PONG`] envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbePayload {
    /// Per-channel probe counter, echoed back by the peer.
    pub seq: u64,
}

// ---------------------------------------------------------------------------
// Lifecycle events (core → local subscribers)
// ---------------------------------------------------------------------------

/// Names of the lifecycle events the core dispatches to subscribers.
///
/// These never travel on the wire; inbound envelopes with other names
/// are passed through to subscribers verbatim.
pub mod lifecycle {
    /// Entering `Open`. Payload: `null`.
    pub const CONNECTED: &str = "connected";
    /// Leaving `Open`. Payload: the closure reason as a string.
    pub const DISCONNECTED: &str = "disconnected";
    /// A retry was scheduled. Payload: [`ReconnectingInfo`](super::ReconnectingInfo).
    pub const RECONNECTING: &str = "reconnecting";
    /// Attempts exhausted. Payload: [`ConnectionFailedInfo`](super::ConnectionFailedInfo).
    pub const CONNECTION_FAILED: &str = "connection_failed";
    /// Send while not open. Payload: [`MessageQueuedInfo`](super::MessageQueuedInfo).
    pub const MESSAGE_QUEUED: &str = "message_queued";
    /// Write failed or queued entry dropped. Payload: [`MessageFailedInfo`](super::MessageFailedInfo).
    pub const MESSAGE_FAILED: &str = "message_failed";
    /// Unclassified transport error. Payload: the error as a string.
    pub const ERROR: &str = "error";
}

/// Payload of the `reconnecting` lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectingInfo {
    /// 1-indexed attempt number about to be made.
    pub attempt: u32,
    /// Ceiling from the reconnection policy.
    pub max_attempts: u32,
    /// Backoff delay before the attempt, in milliseconds.
    pub delay: u64,
}

/// Payload of the `connection_failed` lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionFailedInfo {
    /// Why the last attempt failed.
    pub reason: String,
    /// How many reconnection attempts were made.
    pub attempts: u32,
}

/// Payload of the `message_queued` lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQueuedInfo {
    pub event_name: String,
    pub payload: Value,
}

/// Payload of the `message_failed` lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFailedInfo {
    pub event_name: String,
    pub payload: Value,
    pub error: String,
}

// =========================================================================
// Tests
// =========================================================================
