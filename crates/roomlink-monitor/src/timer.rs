//! One-shot scheduled tasks that can be cancelled deterministically.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// A callback that runs once after a delay, unless cancelled first.
///
/// The callback should be cheap and non-blocking: in roomlink it only
/// posts an event to the connection manager's queue, which then decides
/// what the firing means. Dropping a `ScheduledTask` cancels it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
    fires_at: Instant,
}

impl ScheduledTask {
    /// Schedules `callback` to run after `delay` on the current Tokio
    /// runtime.
    pub fn after<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let fires_at = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            time::sleep_until(fires_at).await;
            callback();
        });
        Self { handle, fires_at }
    }

    /// Cancels the task. A no-op if it already fired.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns `true` once the callback ran or the task was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// When the callback is (or was) due.
    pub fn fires_at(&self) -> Instant {
        self.fires_at
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
