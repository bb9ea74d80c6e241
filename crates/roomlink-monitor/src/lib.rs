//! Liveness monitoring and cancellable timers for roomlink connections.
//!
//! Two pieces, both owned by the connection manager:
//!
//! - [`ConnectionMonitor`] probes an open channel at a fixed interval and
//!   reports a [`MonitorEvent::Stale`] when the peer goes quiet for longer
//!   than the probe timeout.
//! - [`ScheduledTask`] is a one-shot delayed callback used for reconnect
//!   backoff. Cancelling (or dropping) it guarantees the callback never runs.
//!
//! # Integration
//!
//! Neither type touches the channel. They post events back to the owner,
//! which handles them on its own serialized loop:
//!
//! ```ignore
//! let tx = events_tx.clone();
//! monitor.start(move |event| {
//!     let _ = tx.send(Event::Monitor { generation, event });
//! });
//! ```

mod monitor;
mod timer;

pub use monitor::{ConnectionMonitor, MonitorConfig, MonitorEvent};
pub use timer::ScheduledTask;
