//! # roomlink
//!
//! Resilient real-time connection core for web game clients.
//!
//! A [`ConnectionManager`] keeps one logical duplex channel to a game
//! server destination alive: it reconnects with exponential backoff,
//! queues outbound envelopes during outages and flushes them in order,
//! probes the channel for liveness, and dispatches inbound and lifecycle
//! events to registered handlers.
//!
//! ```text
//! roomlink            ← ConnectionManager, state machine, subscribers
//!   ├─ roomlink-session    ← MessageQueue, ReconnectPolicy
//!   ├─ roomlink-monitor    ← ConnectionMonitor, ScheduledTask
//!   ├─ roomlink-protocol   ← Envelope, Codec
//!   └─ roomlink-transport  ← Connector / Channel, WebSocket client
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomlink::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let manager = ConnectionManager::builder()
//!     .build(WebSocketConnector::new("ws://localhost:8080/rooms"));
//!
//! manager.on(lifecycle::RECONNECTING, |info| eprintln!("retrying: {info}"))?;
//! manager.on("state", |data| println!("state update: {data}"))?;
//!
//! manager.connect("ABCD")?;
//! manager.send("move", json!({ "row": 1, "col": 2 }))?;
//! # Ok(())
//! # }
//! ```

mod actor;
mod config;
mod error;
mod manager;
mod registry;
mod state;

pub use config::ManagerConfig;
pub use error::ClientError;
pub use manager::{ConnectionManager, ConnectionManagerBuilder, ManagerInfo};
pub use registry::{Handler, SubscriberRegistry, SubscriptionId};
pub use state::ConnectionState;

pub use roomlink_monitor::{MonitorConfig, ScheduledTask};
pub use roomlink_protocol::{
    Codec, ConnectionFailedInfo, Envelope, JsonCodec, MessageFailedInfo, MessageQueuedInfo,
    ProtocolError, ReconnectingInfo, lifecycle, reserved,
};
pub use roomlink_session::ReconnectPolicy;
pub use roomlink_transport::{
    Channel, ChannelId, Connector, Destination, TransportError, WebSocketChannel,
    WebSocketConnector,
};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::{
        ClientError, ConnectionManager, ConnectionManagerBuilder, ConnectionState, Destination,
        ManagerConfig, MonitorConfig, ReconnectPolicy, SubscriptionId, WebSocketConnector,
        lifecycle,
    };
}
