//! Connection manager actor: one Tokio task that owns every piece of
//! mutable connection state.
//!
//! Handles talk to it through [`Command`]s. Helper tasks (the handshake,
//! the channel reader, the liveness monitor and retry timers) never touch
//! state; they post [`Event`]s tagged with the generation they were started
//! under, and the actor discards any event whose generation is stale.
//!
//! ```text
//!  ConnectionManager ──Command──┐
//!                               ▼
//!  open task ──────┐     ┌────────────┐
//!  reader task ────┼────►│   actor    │──dispatch──► subscribers
//!  monitor task ───┤Event│ (this file)│──write─────► channel
//!  retry timer ────┘     └────────────┘
//! ```

use std::io;
use std::sync::Arc;

use roomlink_monitor::{ConnectionMonitor, MonitorEvent, ScheduledTask};
use roomlink_protocol::{
    Codec, ConnectionFailedInfo, Envelope, MessageFailedInfo, MessageQueuedInfo, ProbePayload,
    ReconnectingInfo, lifecycle, reserved,
};
use roomlink_session::{MessageQueue, QueuedMessage};
use roomlink_transport::{Channel, Connector, Destination, TransportError};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, trace, warn};

use crate::manager::{Command, ManagerInfo};
use crate::registry::SubscriberRegistry;
use crate::{ClientError, ConnectionState, ManagerConfig};

/// Reason reported with `disconnected` after an explicit `disconnect()`.
const REASON_CLIENT_DISCONNECT: &str = "client disconnect";
/// Reason reported with `disconnected` when `connect()` names a new destination.
const REASON_SWITCHING: &str = "switching destination";

/// Results posted back to the actor by its helper tasks.
enum Event<Ch> {
    /// The handshake for `generation` produced a live channel.
    Opened { generation: u64, channel: Ch },
    /// The handshake for `generation` failed or timed out.
    OpenFailed { generation: u64, reason: String },
    /// A frame arrived on the channel opened under `generation`.
    Inbound { generation: u64, bytes: Vec<u8> },
    /// The channel opened under `generation` stopped delivering frames.
    Closed {
        generation: u64,
        reason: String,
        error: Option<String>,
    },
    /// The backoff delay scheduled under `generation` elapsed.
    RetryDue { generation: u64 },
    /// The liveness monitor started under `generation` wants something done.
    Monitor { generation: u64, event: MonitorEvent },
}

/// One logical session to one destination.
struct Connection<Ch> {
    destination: Destination,
    state: ConnectionState,
    attempt_count: u32,
    intentional_close: bool,
    channel: Option<Arc<Ch>>,
}

impl<Ch> Connection<Ch> {
    fn new(destination: Destination) -> Self {
        Self {
            destination,
            state: ConnectionState::Idle,
            attempt_count: 0,
            intentional_close: false,
            channel: None,
        }
    }
}

/// The internal manager state. Runs inside a Tokio task.
pub(crate) struct ManagerActor<T: Connector, C: Codec> {
    connector: Arc<T>,
    codec: C,
    config: ManagerConfig,

    connection: Option<Connection<T::Channel>>,
    /// Fences asynchronous results. Bumped on every open attempt and every
    /// teardown; never reused.
    generation: u64,
    /// A same-destination `connect` that arrived mid-handshake.
    pending_connect: bool,

    queue: MessageQueue,
    registry: SubscriberRegistry,
    monitor: ConnectionMonitor,

    retry: Option<ScheduledTask>,
    open_task: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    /// Close of the previous channel; the next open awaits it.
    closing: Option<JoinHandle<()>>,

    commands: mpsc::UnboundedReceiver<Command>,
    events_tx: mpsc::UnboundedSender<Event<T::Channel>>,
    events_rx: mpsc::UnboundedReceiver<Event<T::Channel>>,
    state_tx: watch::Sender<ConnectionState>,
    teardown: watch::Receiver<u64>,
}

impl<T: Connector, C: Codec> ManagerActor<T, C> {
    pub(crate) fn new(
        connector: T,
        codec: C,
        config: ManagerConfig,
        commands: mpsc::UnboundedReceiver<Command>,
        state_tx: watch::Sender<ConnectionState>,
        teardown: watch::Receiver<u64>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connector: Arc::new(connector),
            codec,
            queue: MessageQueue::with_capacity_limit(config.queue_capacity),
            monitor: ConnectionMonitor::new(config.monitor.clone()),
            config,
            connection: None,
            generation: 0,
            pending_connect: false,
            registry: SubscriberRegistry::new(),
            retry: None,
            open_task: None,
            reader: None,
            closing: None,
            commands,
            events_tx,
            events_rx,
            state_tx,
            teardown,
        }
    }

    /// Runs the actor loop until every handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!("connection manager started");

        loop {
            tokio::select! {
                // Decided transitions land before later commands are read.
                biased;

                Some(event) = self.events_rx.recv() => self.handle_event(event).await,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
            }
        }

        self.release_connection(None);
        self.queue.clear();
        debug!("connection manager stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { destination } => self.connect(destination),
            Command::Send { event, payload } => self.send(event, payload).await,
            Command::Subscribe { event, id, handler } => {
                debug!(event = %event, subscription = %id, "subscribed");
                self.registry.insert(event, id, handler);
            }
            Command::Unsubscribe { event, id } => {
                let removed = self.registry.off(&event, id);
                debug!(event = %event, removed, "unsubscribed");
            }
            Command::Disconnect { reply } => {
                self.disconnect();
                let _ = reply.send(());
            }
            Command::Inspect { reply } => {
                let _ = reply.send(self.info());
            }
        }
    }

    async fn handle_event(&mut self, event: Event<T::Channel>) {
        match event {
            Event::Opened {
                generation,
                channel,
            } => self.on_opened(generation, channel).await,
            Event::OpenFailed { generation, reason } => self.on_open_failed(generation, reason),
            Event::Inbound { generation, bytes } => self.on_inbound(generation, &bytes).await,
            Event::Closed {
                generation,
                reason,
                error,
            } => self.on_closed(generation, reason, error),
            Event::RetryDue { generation } => self.on_retry_due(generation),
            Event::Monitor { generation, event } => self.on_monitor(generation, event).await,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    fn connect(&mut self, destination: Destination) {
        if let Some(conn) = &self.connection {
            if conn.destination == destination {
                match conn.state {
                    ConnectionState::Open => {
                        debug!(%destination, "already open");
                        return;
                    }
                    ConnectionState::Connecting => {
                        debug!(%destination, "handshake in flight: parking connect");
                        self.pending_connect = true;
                        return;
                    }
                    ConnectionState::Reconnecting => {
                        debug!(%destination, "retry already scheduled");
                        return;
                    }
                    ConnectionState::Failed | ConnectionState::Idle | ConnectionState::Closing => {}
                }
            } else {
                let notice = conn.state.is_open().then_some(REASON_SWITCHING);
                info!(from = %conn.destination, to = %destination, "switching destination");
                self.release_connection(notice);
            }
        }

        match self.connection.as_mut() {
            // Fresh start after Failed: same destination, attempts reset.
            Some(conn) => {
                conn.attempt_count = 0;
                conn.intentional_close = false;
            }
            None => self.connection = Some(Connection::new(destination)),
        }
        self.start_attempt();
    }

    async fn send(&mut self, event: String, payload: Value) {
        let message = QueuedMessage::stamped(event, payload, now());

        let Some(channel) = self.live_channel() else {
            self.enqueue(message.clone());
            self.emit(
                lifecycle::MESSAGE_QUEUED,
                &MessageQueuedInfo {
                    event_name: message.event_name,
                    payload: message.payload,
                },
            );
            return;
        };

        if !self.queue.is_empty() {
            // Older entries go first: a failed flush left the channel open,
            // so this send is what retries them.
            self.enqueue(message);
            self.flush().await;
            return;
        }

        match self.write_message(&channel, &message).await {
            Ok(()) => trace!(event = %message.event_name, "sent"),
            Err(e) if is_cancelled(&e) => {
                debug!(event = %message.event_name, "write cancelled by disconnect");
            }
            Err(e) => {
                warn!(event = %message.event_name, error = %e, "write failed: queued for retry");
                let error = e.to_string();
                self.enqueue(message.clone());
                self.report_failed(message, error);
            }
        }
    }

    fn disconnect(&mut self) {
        let notice = self
            .connection
            .as_ref()
            .filter(|c| {
                matches!(
                    c.state,
                    ConnectionState::Connecting | ConnectionState::Open | ConnectionState::Reconnecting
                )
            })
            .map(|_| REASON_CLIENT_DISCONNECT);
        self.release_connection(notice);
        self.queue.clear();
        self.registry.clear();
    }

    fn info(&self) -> ManagerInfo {
        ManagerInfo {
            state: self.state(),
            destination: self.connection.as_ref().map(|c| c.destination.clone()),
            attempt_count: self.connection.as_ref().map_or(0, |c| c.attempt_count),
            queued: self.queue.len(),
            subscriptions: self.registry.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Helper task results
    // -----------------------------------------------------------------------

    async fn on_opened(&mut self, generation: u64, channel: T::Channel) {
        if generation != self.generation || self.state() != ConnectionState::Connecting {
            debug!(generation, current = self.generation, "stale handshake result: closing");
            self.spawn_close(Arc::new(channel));
            return;
        }
        self.open_task = None;

        let channel = Arc::new(channel);
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        conn.channel = Some(Arc::clone(&channel));
        conn.attempt_count = 0;
        let destination = conn.destination.clone();
        self.transition(ConnectionState::Open);
        info!(%destination, channel_id = %channel.id(), generation, "channel open");

        self.spawn_reader(generation, Arc::clone(&channel));
        self.flush().await;
        self.start_monitor(generation);
        self.registry.dispatch(lifecycle::CONNECTED, &Value::Null);

        let ready = Envelope::new(reserved::CLIENT_READY, Value::String(destination.to_string()));
        match self.write_envelope(&channel, &ready).await {
            Ok(()) => {}
            Err(e) if is_cancelled(&e) => debug!("readiness envelope cancelled by disconnect"),
            Err(e) => {
                warn!(error = %e, "readiness envelope not sent");
                self.registry.dispatch(lifecycle::ERROR, &Value::String(e.to_string()));
            }
        }

        self.replay_pending_connect(destination);
    }

    fn on_open_failed(&mut self, generation: u64, reason: String) {
        if generation != self.generation || self.state() != ConnectionState::Connecting {
            debug!(generation, %reason, "stale handshake failure ignored");
            return;
        }
        self.open_task = None;
        info!(generation, %reason, "open failed");
        self.schedule_retry(reason);

        if let Some(destination) = self.connection.as_ref().map(|c| c.destination.clone()) {
            self.replay_pending_connect(destination);
        }
    }

    async fn on_inbound(&mut self, generation: u64, bytes: &[u8]) {
        if !self.is_current_open(generation) {
            trace!(generation, "frame from stale channel ignored");
            return;
        }
        self.monitor.record_traffic();

        let envelope = match self.codec.decode_envelope(bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(error = %e, len = bytes.len(), "dropping malformed envelope");
                return;
            }
        };

        match envelope.event.as_str() {
            reserved::PONG => trace!("pong"),
            reserved::PING => {
                let Some(channel) = self.live_channel() else {
                    return;
                };
                let pong = Envelope::new(reserved::PONG, envelope.data);
                if let Err(e) = self.write_envelope(&channel, &pong).await {
                    debug!(error = %e, "pong not sent");
                    if is_cancelled(&e) {
                        return;
                    }
                    self.registry.dispatch(lifecycle::ERROR, &Value::String(e.to_string()));
                }
            }
            event => {
                if self.registry.has_subscribers(event) {
                    self.registry.dispatch(event, &envelope.data);
                } else {
                    debug!(event, "no subscribers: dropping");
                }
            }
        }
    }

    fn on_closed(&mut self, generation: u64, reason: String, error: Option<String>) {
        let intentional = self.connection.as_ref().is_some_and(|c| c.intentional_close);
        if intentional || !self.is_current_open(generation) {
            debug!(generation, %reason, "closure of stale or released channel ignored");
            return;
        }
        if let Some(error) = error {
            self.registry.dispatch(lifecycle::ERROR, &Value::String(error));
        }
        self.connection_lost(reason);
    }

    fn on_retry_due(&mut self, generation: u64) {
        if generation != self.generation || self.state() != ConnectionState::Reconnecting {
            debug!(generation, "stale retry timer ignored");
            return;
        }
        self.retry = None;
        self.start_attempt();
    }

    async fn on_monitor(&mut self, generation: u64, event: MonitorEvent) {
        if !self.is_current_open(generation) {
            return;
        }
        match event {
            MonitorEvent::Probe { seq } => {
                let Some(channel) = self.live_channel() else {
                    return;
                };
                let payload = match serde_json::to_value(ProbePayload { seq }) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "probe payload not encodable");
                        return;
                    }
                };
                trace!(seq, "probe");
                if let Err(e) = self
                    .write_envelope(&channel, &Envelope::new(reserved::PING, payload))
                    .await
                {
                    debug!(seq, error = %e, "probe not sent");
                    if is_cancelled(&e) {
                        return;
                    }
                    self.registry.dispatch(lifecycle::ERROR, &Value::String(e.to_string()));
                }
            }
            MonitorEvent::Stale { silent_for } => {
                let reason = format!(
                    "no traffic for {}ms after liveness probe",
                    silent_for.as_millis()
                );
                self.connection_lost(reason);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Starts a handshake for the current connection's destination.
    fn start_attempt(&mut self) {
        let Some(conn) = self.connection.as_ref() else {
            return;
        };
        let destination = conn.destination.clone();
        let attempt = conn.attempt_count;

        self.generation += 1;
        let generation = self.generation;
        self.transition(ConnectionState::Connecting);
        debug!(%destination, generation, attempt, "opening channel");

        let connector = Arc::clone(&self.connector);
        let events = self.events_tx.clone();
        let connect_timeout = self.config.connect_timeout;
        let prior_close = self.closing.take();

        self.open_task = Some(tokio::spawn(async move {
            // At most one live channel: the previous one is fully closed first.
            if let Some(prior) = prior_close {
                let _ = prior.await;
            }
            let event = match time::timeout(connect_timeout, connector.open(&destination)).await {
                Ok(Ok(channel)) => Event::Opened {
                    generation,
                    channel,
                },
                Ok(Err(e)) => Event::OpenFailed {
                    generation,
                    reason: e.to_string(),
                },
                Err(_) => Event::OpenFailed {
                    generation,
                    reason: TransportError::Timeout("connect").to_string(),
                },
            };
            let _ = events.send(event);
        }));
    }

    /// Backs off and retries, or gives up once the policy is exhausted.
    fn schedule_retry(&mut self, reason: String) {
        let policy = self.config.policy;
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        let next = policy.next_attempt(conn.attempt_count);
        if let Some((attempt, _)) = next {
            conn.attempt_count = attempt;
        }
        let attempts = conn.attempt_count;
        let destination = conn.destination.clone();
        self.transition(ConnectionState::Reconnecting);

        match next {
            Some((attempt, delay)) => {
                let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                info!(%destination, attempt, delay_ms, %reason, "reconnecting");
                self.emit(
                    lifecycle::RECONNECTING,
                    &ReconnectingInfo {
                        attempt,
                        max_attempts: policy.max_attempts(),
                        delay: delay_ms,
                    },
                );

                let generation = self.generation;
                let events = self.events_tx.clone();
                self.retry = Some(ScheduledTask::after(delay, move || {
                    let _ = events.send(Event::RetryDue { generation });
                }));
            }
            None => {
                self.stop_helpers();
                self.close_channel();
                self.transition(ConnectionState::Failed);
                info!(%destination, attempts, %reason, "connection failed: giving up");
                self.emit(
                    lifecycle::CONNECTION_FAILED,
                    &ConnectionFailedInfo { reason, attempts },
                );
                // The queue survives for the next explicit connect; handlers do not.
                self.registry.clear();
            }
        }
    }

    /// The live channel died (transport closure or stale verdict).
    fn connection_lost(&mut self, reason: String) {
        self.stop_helpers();
        self.close_channel();
        if let Some(conn) = &self.connection {
            info!(destination = %conn.destination, %reason, "channel lost");
        }
        self.registry
            .dispatch(lifecycle::DISCONNECTED, &Value::String(reason.clone()));
        self.schedule_retry(reason);
    }

    /// Intentional teardown of the current connection, if any.
    ///
    /// `notice` is the `disconnected` reason to dispatch, or `None` to stay
    /// silent. The queue and registry are left alone.
    fn release_connection(&mut self, notice: Option<&str>) {
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        conn.intentional_close = true;
        let destination = conn.destination.clone();

        // Anything still in flight belongs to the old connection now.
        self.generation += 1;
        self.pending_connect = false;
        self.transition(ConnectionState::Closing);
        self.stop_helpers();
        self.close_channel();

        if let Some(reason) = notice {
            self.registry
                .dispatch(lifecycle::DISCONNECTED, &Value::String(reason.to_string()));
        }
        self.transition(ConnectionState::Idle);
        self.connection = None;
        info!(%destination, "connection closed");
    }

    fn replay_pending_connect(&mut self, destination: Destination) {
        if std::mem::take(&mut self.pending_connect) {
            debug!(%destination, "replaying parked connect");
            self.connect(destination);
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            warn!(from = %current, to = %next, "unexpected state transition");
        }
        if let Some(conn) = self.connection.as_mut() {
            conn.state = next;
        }
        self.state_tx.send_replace(next);
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Sends every queued message in order. Stops at the first failure and
    /// puts the unsent tail back at the front of the queue.
    async fn flush(&mut self) {
        let Some(channel) = self.live_channel() else {
            return;
        };
        if let Some(ttl) = self.config.message_ttl {
            for expired in self.queue.expire_older_than(ttl, now()) {
                debug!(event = %expired.event_name, "queued message expired");
                self.report_failed(expired, "expired".to_string());
            }
        }
        if self.queue.is_empty() {
            return;
        }

        let pending = self.queue.take_all();
        let total = pending.len();
        let mut pending = pending.into_iter();
        while let Some(message) = pending.next() {
            if let Err(e) = self.write_message(&channel, &message).await {
                let mut unsent = vec![message];
                unsent.extend(pending);
                warn!(error = %e, unsent = unsent.len(), total, "flush aborted");
                self.queue.requeue_front(unsent);
                return;
            }
        }
        debug!(count = total, "queue flushed");
    }

    async fn write_message(
        &self,
        channel: &Arc<T::Channel>,
        message: &QueuedMessage,
    ) -> Result<(), ClientError> {
        let envelope = Envelope::new(message.event_name.clone(), message.payload.clone());
        self.write_envelope(channel, &envelope).await
    }

    /// Encodes and writes one envelope, bounded by `write_timeout` and
    /// cancelled by a concurrent `disconnect()`.
    async fn write_envelope(
        &self,
        channel: &Arc<T::Channel>,
        envelope: &Envelope,
    ) -> Result<(), ClientError> {
        let bytes = self.codec.encode(envelope)?;

        let mut teardown = self.teardown.clone();
        teardown.borrow_and_update();
        let cancelled = async move {
            if teardown.changed().await.is_err() {
                // All handles gone: the command loop ends on its own.
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = time::timeout(self.config.write_timeout, channel.send(&bytes)) => match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(TransportError::SendFailed(io::Error::other(e)).into()),
                Err(_) => Err(TransportError::Timeout("write").into()),
            },
            () = cancelled => Err(TransportError::Shutdown.into()),
        }
    }

    fn enqueue(&mut self, message: QueuedMessage) {
        if let Some(evicted) = self.queue.push(message) {
            self.report_failed(evicted, "evicted".to_string());
        }
    }

    fn report_failed(&self, message: QueuedMessage, error: String) {
        self.emit(
            lifecycle::MESSAGE_FAILED,
            &MessageFailedInfo {
                event_name: message.event_name,
                payload: message.payload,
                error,
            },
        );
    }

    // -----------------------------------------------------------------------
    // Helper tasks
    // -----------------------------------------------------------------------

    fn spawn_reader(&mut self, generation: u64, channel: Arc<T::Channel>) {
        let events = self.events_tx.clone();
        self.reader = Some(tokio::spawn(async move {
            loop {
                let event = match channel.recv().await {
                    Ok(Some(bytes)) => Event::Inbound { generation, bytes },
                    Ok(None) => Event::Closed {
                        generation,
                        reason: "closed by peer".to_string(),
                        error: None,
                    },
                    Err(e) => Event::Closed {
                        generation,
                        reason: e.to_string(),
                        error: Some(e.to_string()),
                    },
                };
                let done = matches!(event, Event::Closed { .. });
                if events.send(event).is_err() || done {
                    break;
                }
            }
            trace!(channel_id = %channel.id(), "reader stopped");
        }));
    }

    fn start_monitor(&mut self, generation: u64) {
        let events = self.events_tx.clone();
        self.monitor.start(move |event| {
            let _ = events.send(Event::Monitor { generation, event });
        });
    }

    /// Cancels the retry timer, the handshake, the monitor and the reader.
    fn stop_helpers(&mut self) {
        if let Some(retry) = self.retry.take() {
            retry.cancel();
        }
        if let Some(open) = self.open_task.take() {
            open.abort();
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.monitor.stop();
    }

    /// Detaches the current channel and closes it in the background.
    fn close_channel(&mut self) {
        if let Some(channel) = self.connection.as_mut().and_then(|c| c.channel.take()) {
            self.spawn_close(channel);
        }
    }

    fn spawn_close(&mut self, channel: Arc<T::Channel>) {
        let close_timeout = self.config.close_timeout;
        let prior = self.closing.take();
        self.closing = Some(tokio::spawn(async move {
            if let Some(prior) = prior {
                let _ = prior.await;
            }
            let channel_id = channel.id();
            match time::timeout(close_timeout, channel.close()).await {
                Ok(Ok(())) => debug!(%channel_id, "channel closed"),
                Ok(Err(e)) => debug!(%channel_id, error = %e, "channel close failed"),
                Err(_) => warn!(%channel_id, "channel close timed out"),
            }
        }));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map_or(ConnectionState::Idle, |c| c.state)
    }

    fn is_current_open(&self, generation: u64) -> bool {
        generation == self.generation && self.state() == ConnectionState::Open
    }

    fn live_channel(&self) -> Option<Arc<T::Channel>> {
        self.connection
            .as_ref()
            .filter(|c| c.state == ConnectionState::Open)
            .and_then(|c| c.channel.clone())
    }

    /// Serializes a lifecycle payload and dispatches it.
    fn emit<P: Serialize>(&self, event: &str, payload: &P) {
        match serde_json::to_value(payload) {
            Ok(value) => {
                self.registry.dispatch(event, &value);
            }
            Err(e) => warn!(event, error = %e, "lifecycle payload not encodable"),
        }
    }
}

/// Whether a write was abandoned because `disconnect()` was called.
fn is_cancelled(error: &ClientError) -> bool {
    matches!(error, ClientError::Transport(TransportError::Shutdown))
}

/// Current instant on the Tokio clock, so paused-time tests age the queue.
fn now() -> std::time::Instant {
    time::Instant::now().into_std()
}
