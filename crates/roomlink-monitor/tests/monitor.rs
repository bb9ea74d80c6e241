//! Integration tests for the connection monitor.
//!
//! All tests run on a paused clock: `sleep` auto-advances time, so probe
//! and deadline instants are exact.

use std::time::Duration;

use roomlink_monitor::{ConnectionMonitor, MonitorConfig, MonitorEvent};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

// =========================================================================
// Helpers
// =========================================================================

fn config(interval_ms: u64, timeout_ms: u64) -> MonitorConfig {
    MonitorConfig {
        probe_interval: Duration::from_millis(interval_ms),
        probe_timeout: Duration::from_millis(timeout_ms),
        initial_jitter: Duration::ZERO,
    }
}

fn start(
    monitor: &mut ConnectionMonitor,
) -> mpsc::UnboundedReceiver<(Instant, MonitorEvent)> {
    let (tx, rx) = mpsc::unbounded_channel();
    monitor.start(move |event| {
        let _ = tx.send((Instant::now(), event));
    });
    rx
}

// =========================================================================
// MonitorConfig
// =========================================================================

#[test]
fn test_default_config_is_enabled() {
    let cfg = MonitorConfig::default();
    assert!(cfg.is_enabled());
    assert_eq!(cfg.probe_interval, Duration::from_secs(25));
    assert_eq!(cfg.probe_timeout, Duration::from_secs(10));
}

#[test]
fn test_zero_interval_disables() {
    assert!(!MonitorConfig::disabled().is_enabled());
    assert!(!config(0, 100).is_enabled());
}

#[test]
fn test_validated_clamps_tiny_timeout() {
    let cfg = config(1000, 0).validated();
    assert_eq!(cfg.probe_timeout, MonitorConfig::MIN_PROBE_TIMEOUT);
}

// =========================================================================
// Probing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_probes_fire_at_interval_while_traffic_flows() {
    let mut monitor = ConnectionMonitor::new(config(1000, 500));
    let t0 = Instant::now();
    let mut rx = start(&mut monitor);

    for expected_seq in 1..=3u64 {
        let (at, event) = rx.recv().await.unwrap();
        assert_eq!(event, MonitorEvent::Probe { seq: expected_seq });
        assert_eq!(at - t0, Duration::from_millis(1000 * expected_seq));
        // Peer answers right away.
        monitor.record_traffic();
    }
    assert!(monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_silence_after_probe_goes_stale_at_deadline() {
    // interval < timeout: a second probe goes out while the first
    // deadline is still armed and must not push it back.
    let mut monitor = ConnectionMonitor::new(config(1000, 2000));
    let t0 = Instant::now();
    let mut rx = start(&mut monitor);

    let (_, first) = rx.recv().await.unwrap();
    assert_eq!(first, MonitorEvent::Probe { seq: 1 });
    let (_, second) = rx.recv().await.unwrap();
    assert_eq!(second, MonitorEvent::Probe { seq: 2 });

    let (at, stale) = rx.recv().await.unwrap();
    assert_eq!(at - t0, Duration::from_millis(3000));
    assert_eq!(
        stale,
        MonitorEvent::Stale {
            silent_for: Duration::from_millis(2000)
        }
    );

    // Task ends after reporting stale.
    assert!(rx.recv().await.is_none());
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_pong_then_silence_goes_stale_on_next_probe_deadline() {
    let mut monitor = ConnectionMonitor::new(config(1000, 300));
    let t0 = Instant::now();
    let mut rx = start(&mut monitor);

    let (_, event) = rx.recv().await.unwrap();
    assert_eq!(event, MonitorEvent::Probe { seq: 1 });
    monitor.record_traffic();

    let (_, event) = rx.recv().await.unwrap();
    assert_eq!(event, MonitorEvent::Probe { seq: 2 });

    let (at, event) = rx.recv().await.unwrap();
    assert!(matches!(event, MonitorEvent::Stale { .. }));
    assert_eq!(at - t0, Duration::from_millis(2300));
}

#[tokio::test(start_paused = true)]
async fn test_idle_but_healthy_channel_is_not_stale() {
    // Long interval, short timeout; the peer only speaks when probed.
    let mut monitor = ConnectionMonitor::new(config(5000, 1000));
    let mut rx = start(&mut monitor);

    for _ in 0..4 {
        let (_, event) = rx.recv().await.unwrap();
        assert!(matches!(event, MonitorEvent::Probe { .. }));
        time::sleep(Duration::from_millis(200)).await;
        monitor.record_traffic();
    }
    assert!(monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_all_timers() {
    let mut monitor = ConnectionMonitor::new(config(1000, 500));
    let mut rx = start(&mut monitor);

    monitor.stop();
    assert!(!monitor.is_running());

    // Sender dropped with the aborted task: channel closes without events.
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_run() {
    let mut monitor = ConnectionMonitor::new(config(1000, 500));
    let mut old_rx = start(&mut monitor);
    let mut new_rx = start(&mut monitor);

    assert!(old_rx.recv().await.is_none());
    let (_, event) = new_rx.recv().await.unwrap();
    assert_eq!(event, MonitorEvent::Probe { seq: 1 });
}

#[tokio::test(start_paused = true)]
async fn test_disabled_monitor_never_runs() {
    let mut monitor = ConnectionMonitor::new(MonitorConfig::disabled());
    let mut rx = start(&mut monitor);

    assert!(!monitor.is_running());
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_first_probe_jitter_stays_in_range() {
    let mut cfg = config(1000, 500);
    cfg.initial_jitter = Duration::from_millis(200);
    let mut monitor = ConnectionMonitor::new(cfg);
    let t0 = Instant::now();
    let mut rx = start(&mut monitor);

    let (at, _) = rx.recv().await.unwrap();
    let elapsed = at - t0;
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1200));
}
