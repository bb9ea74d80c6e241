//! Connection liveness monitor.
//!
//! While a channel is `Open`, a background task probes it at a fixed
//! interval and watches for inbound traffic. The task never touches the
//! channel itself: it emits [`MonitorEvent`]s and the owner (the connection
//! manager's serialized processor) acts on them.
//!
//! ```text
//!  probe ──arm deadline──►  traffic? ──yes──► disarm, wait for next probe
//!                               │
//!                               no, deadline elapsed
//!                               ▼
//!                          MonitorEvent::Stale
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing for liveness probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Time between probes. `Duration::ZERO` disables monitoring.
    pub probe_interval: Duration,
    /// How long after a probe the channel may stay silent before it is
    /// declared stale.
    pub probe_timeout: Duration,
    /// Random jitter (0..max) added to the *first* probe so clients that
    /// opened together do not probe in lockstep.
    pub initial_jitter: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(25),
            probe_timeout: Duration::from_secs(10),
            initial_jitter: Duration::from_millis(500),
        }
    }
}

impl MonitorConfig {
    /// Shortest probe timeout accepted.
    pub const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(10);

    /// Config with monitoring switched off.
    pub fn disabled() -> Self {
        Self {
            probe_interval: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Whether probes will be sent at all.
    pub fn is_enabled(&self) -> bool {
        !self.probe_interval.is_zero()
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`ConnectionMonitor::new`].
    pub fn validated(mut self) -> Self {
        if self.is_enabled() && self.probe_timeout < Self::MIN_PROBE_TIMEOUT {
            warn!(
                timeout_ms = self.probe_timeout.as_millis() as u64,
                "probe_timeout below minimum: clamping"
            );
            self.probe_timeout = Self::MIN_PROBE_TIMEOUT;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What the monitor asks its owner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Send liveness probe number `seq` (starts at 1 per channel).
    Probe { seq: u64 },
    /// No traffic arrived before the deadline; treat the channel as dead.
    /// The monitor task has stopped.
    Stale { silent_for: Duration },
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Probes one channel at a time. Restart it for every new channel.
pub struct ConnectionMonitor {
    config: MonitorConfig,
    task: Option<JoinHandle<()>>,
    traffic: Arc<Notify>,
}

impl ConnectionMonitor {
    /// Creates an idle monitor.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config: config.validated(),
            task: None,
            traffic: Arc::new(Notify::new()),
        }
    }

    /// The effective (validated) configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Starts probing, replacing any previous run.
    ///
    /// `emit` is called from the monitor task for every [`MonitorEvent`];
    /// it must not block. Does nothing when monitoring is disabled.
    pub fn start<F>(&mut self, emit: F)
    where
        F: Fn(MonitorEvent) + Send + Sync + 'static,
    {
        self.stop();
        if !self.config.is_enabled() {
            debug!("connection monitor disabled (probe_interval = 0)");
            return;
        }

        // Fresh signal per run so a permit left by the previous channel
        // cannot count as traffic on this one.
        self.traffic = Arc::new(Notify::new());
        let traffic = Arc::clone(&self.traffic);
        let config = self.config.clone();
        self.task = Some(tokio::spawn(run_probe_loop(config, traffic, emit)));
    }

    /// Notes that inbound traffic arrived, disarming a pending deadline.
    pub fn record_traffic(&self) {
        self.traffic.notify_one();
    }

    /// Cancels all monitor timers immediately.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            trace!("connection monitor stopped");
        }
    }

    /// Whether a probe loop is currently running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_probe_loop<F>(config: MonitorConfig, traffic: Arc<Notify>, emit: F)
where
    F: Fn(MonitorEvent) + Send + Sync + 'static,
{
    let max_jitter_us = config.initial_jitter.as_micros() as u64;
    let jitter = if max_jitter_us == 0 {
        Duration::ZERO
    } else {
        Duration::from_micros(rand::rng().random_range(0..max_jitter_us))
    };
    let mut next_probe = Instant::now() + config.probe_interval + jitter;
    let mut deadline: Option<(Instant, Instant)> = None; // (armed_at, expires_at)
    let mut seq: u64 = 0;

    debug!(
        interval_ms = config.probe_interval.as_millis() as u64,
        timeout_ms = config.probe_timeout.as_millis() as u64,
        "connection monitor started"
    );

    loop {
        let expires_at = deadline.map(|(_, at)| at);
        tokio::select! {
            // A deadline due at the same instant as a probe wins.
            biased;

            _ = time::sleep_until(expires_at.unwrap_or(next_probe)), if expires_at.is_some() => {
                let silent_for = deadline
                    .map(|(armed_at, _)| Instant::now().saturating_duration_since(armed_at))
                    .unwrap_or_default();
                debug!(silent_ms = silent_for.as_millis() as u64, "probe deadline elapsed: channel stale");
                emit(MonitorEvent::Stale { silent_for });
                return;
            }
            _ = traffic.notified() => {
                if deadline.take().is_some() {
                    trace!(seq, "traffic before deadline: disarmed");
                }
            }
            _ = time::sleep_until(next_probe) => {
                seq += 1;
                let now = Instant::now();
                if deadline.is_none() {
                    deadline = Some((now, now + config.probe_timeout));
                }
                next_probe += config.probe_interval;
                trace!(seq, "probe due");
                emit(MonitorEvent::Probe { seq });
            }
        }
    }
}
