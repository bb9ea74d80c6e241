//! `ConnectionManager` handle and builder.
//!
//! The handle is what application code holds. Every mutating operation is
//! a message to the manager's actor task (see [`crate::actor`]), so the
//! handle is cheap to clone and safe to use from any thread, including
//! from inside an event handler.

use std::sync::Arc;
use std::time::Duration;

use roomlink_monitor::MonitorConfig;
use roomlink_protocol::{Codec, JsonCodec};
use roomlink_session::ReconnectPolicy;
use roomlink_transport::{Connector, Destination};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

use crate::actor::ManagerActor;
use crate::registry::{Handler, SubscriptionId};
use crate::{ClientError, ConnectionState, ManagerConfig};

/// Commands sent from handles to the actor.
pub(crate) enum Command {
    /// Open (or keep) a connection to `destination`.
    Connect { destination: Destination },

    /// Send now if open, otherwise queue.
    Send { event: String, payload: Value },

    /// Register a handler under a pre-allocated id.
    Subscribe {
        event: String,
        id: SubscriptionId,
        handler: Handler,
    },

    /// Remove one handler, or all handlers for the event.
    Unsubscribe {
        event: String,
        id: Option<SubscriptionId>,
    },

    /// Tear everything down. Replies once done.
    Disconnect { reply: oneshot::Sender<()> },

    /// Request a snapshot of the manager.
    Inspect { reply: oneshot::Sender<ManagerInfo> },
}

/// A snapshot of manager internals, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerInfo {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Destination of the current connection, if any.
    pub destination: Option<Destination>,
    /// Failed attempts since the last successful open.
    pub attempt_count: u32,
    /// Messages waiting in the outbound queue.
    pub queued: usize,
    /// Total handler registrations.
    pub subscriptions: usize,
}

/// Handle to a running connection manager.
///
/// Cheap to clone; all clones drive the same connection. When the last
/// handle is dropped the manager closes its channel silently and stops.
/// Handlers that capture a handle keep the manager alive until
/// [`disconnect`](Self::disconnect) clears them.
///
/// # Example
///
/// ```rust,no_run
/// use roomlink::prelude::*;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), ClientError> {
/// let manager = ConnectionManager::new(WebSocketConnector::new("ws://localhost:8080/rooms"));
///
/// manager.on(lifecycle::CONNECTED, |_| println!("online"))?;
/// manager.on("chat", |data| println!("chat: {data}"))?;
///
/// manager.connect("ABCD")?;
/// manager.send("chat", json!({ "text": "hello" }))?;
/// # manager.disconnect().await
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    teardown: Arc<watch::Sender<u64>>,
}

impl ConnectionManager {
    /// Creates a builder.
    pub fn builder() -> ConnectionManagerBuilder {
        ConnectionManagerBuilder::new()
    }

    /// Starts a manager with default settings and the JSON codec.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new<T: Connector>(connector: T) -> Self {
        ConnectionManagerBuilder::new().build(connector)
    }

    /// Connects to `destination`.
    ///
    /// Idempotent for the current destination while open or already
    /// connecting; a different destination tears the current connection
    /// down first. Progress is reported through lifecycle events.
    pub fn connect(&self, destination: impl Into<Destination>) -> Result<(), ClientError> {
        self.command(Command::Connect {
            destination: destination.into(),
        })
    }

    /// Sends an envelope, or queues it until the next successful open.
    pub fn send(&self, event: impl Into<String>, payload: Value) -> Result<(), ClientError> {
        self.command(Command::Send {
            event: event.into(),
            payload,
        })
    }

    /// Registers `handler` for `event`.
    ///
    /// Handlers run on the manager task in registration order and must not
    /// block. Lifecycle event names live in
    /// [`lifecycle`](roomlink_protocol::lifecycle); any other name matches
    /// inbound envelopes verbatim.
    ///
    /// Registrations last until [`disconnect`](Self::disconnect) or until
    /// the manager gives up reconnecting: `connection_failed` is the last
    /// event a handler sees, and a later `connect` needs fresh handlers.
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> Result<SubscriptionId, ClientError>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        self.command(Command::Subscribe {
            event: event.into(),
            id,
            handler: Arc::new(handler),
        })?;
        Ok(id)
    }

    /// Removes the handler `id`, or every handler for `event` when `id` is
    /// `None`.
    pub fn off(&self, event: impl Into<String>, id: Option<SubscriptionId>) -> Result<(), ClientError> {
        self.command(Command::Unsubscribe {
            event: event.into(),
            id,
        })
    }

    /// Tears the connection down and clears the queue and all handlers.
    ///
    /// Returns once the manager has processed the request: no reconnect
    /// attempt or event dispatch happens for the old connection afterwards.
    /// A write in flight when this is called is cancelled without a
    /// `message_failed` or `error` dispatch.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.teardown.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::Disconnect { reply: reply_tx })?;
        reply_rx.await.map_err(|_| ClientError::ManagerStopped)
    }

    /// Returns a snapshot of the manager's internals.
    pub async fn info(&self) -> Result<ManagerInfo, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command(Command::Inspect { reply: reply_tx })?;
        reply_rx.await.map_err(|_| ClientError::ManagerStopped)
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    fn command(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::ManagerStopped)
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and starting a [`ConnectionManager`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use roomlink::prelude::*;
///
/// # async fn run() {
/// let manager = ConnectionManager::builder()
///     .policy(ReconnectPolicy::new(Duration::from_millis(500), Duration::from_secs(5), 8))
///     .message_ttl(Duration::from_secs(30))
///     .build(WebSocketConnector::new("ws://localhost:8080/rooms"));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionManagerBuilder {
    config: ManagerConfig,
}

impl ConnectionManagerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the reconnection policy.
    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Sets the liveness monitor timing.
    pub fn monitor(mut self, monitor: MonitorConfig) -> Self {
        self.config.monitor = monitor;
        self
    }

    /// Sets the transport handshake timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the per-write timeout.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Sets the channel close timeout.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Expires queued messages older than `ttl`.
    pub fn message_ttl(mut self, ttl: Duration) -> Self {
        self.config.message_ttl = Some(ttl);
        self
    }

    /// Bounds the outbound queue to `capacity` entries.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    /// Starts the manager with the JSON codec.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn build<T: Connector>(self, connector: T) -> ConnectionManager {
        self.build_with_codec(connector, JsonCodec)
    }

    /// Starts the manager with a custom codec.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn build_with_codec<T: Connector, C: Codec>(self, connector: T, codec: C) -> ConnectionManager {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (teardown_tx, teardown_rx) = watch::channel(0u64);

        let actor = ManagerActor::new(
            connector,
            codec,
            self.config.validated(),
            commands_rx,
            state_tx,
            teardown_rx,
        );
        tokio::spawn(actor.run());

        ConnectionManager {
            commands: commands_tx,
            state: state_rx,
            teardown: Arc::new(teardown_tx),
        }
    }
}
