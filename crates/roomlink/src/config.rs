//! Connection manager configuration.

use std::time::Duration;

use roomlink_monitor::MonitorConfig;
use roomlink_session::ReconnectPolicy;
use tracing::warn;

/// Shortest accepted connect/write/close timeout.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Configuration for a [`ConnectionManager`](crate::ConnectionManager).
///
/// Every field has a sensible default; override through
/// [`ConnectionManagerBuilder`](crate::ConnectionManagerBuilder) or by
/// struct update syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Backoff schedule and attempt ceiling.
    pub policy: ReconnectPolicy,

    /// Liveness probe timing. `probe_interval = 0` disables probing.
    pub monitor: MonitorConfig,

    /// Upper bound on one transport handshake.
    pub connect_timeout: Duration,

    /// Upper bound on one outbound write.
    pub write_timeout: Duration,

    /// Upper bound on closing a channel before the next open proceeds.
    pub close_timeout: Duration,

    /// Queued messages older than this are dropped at flush time and
    /// reported as `message_failed` with error `"expired"`. `None` keeps
    /// them forever.
    pub message_ttl: Option<Duration>,

    /// Maximum queued messages. When full the oldest entry is evicted and
    /// reported as `message_failed` with error `"evicted"`. `None` is
    /// unbounded.
    pub queue_capacity: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::default(),
            monitor: MonitorConfig::default(),
            connect_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
            close_timeout: Duration::from_secs(2),
            message_ttl: None,
            queue_capacity: None,
        }
    }
}

impl ManagerConfig {
    /// Clamp out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        self.policy = self.policy.validated();
        self.monitor = self.monitor.validated();

        for (name, value) in [
            ("connect_timeout", &mut self.connect_timeout),
            ("write_timeout", &mut self.write_timeout),
            ("close_timeout", &mut self.close_timeout),
        ] {
            if *value < MIN_TIMEOUT {
                warn!(setting = name, "timeout is zero: clamping to 1ms");
                *value = MIN_TIMEOUT;
            }
        }

        if self.queue_capacity == Some(0) {
            warn!("queue_capacity of 0 would drop every message: using 1");
            self.queue_capacity = Some(1);
        }
        self
    }
}
