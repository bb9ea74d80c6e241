//! Session-scoped state that outlives any single channel.
//!
//! Two leaf components of the connection core live here, neither of which
//! does I/O or touches a clock on its own:
//!
//! 1. **Outbound queue**: [`MessageQueue`] buffers envelopes sent while no
//!    channel is live and hands them back, in order, for flushing.
//! 2. **Reconnection policy**: [`ReconnectPolicy`] maps an attempt number
//!    to a backoff delay and decides when to give up.
//!
//! # How it fits in the stack
//!
//! ```text
//! Connection manager (above)  ← owns one queue + one policy per instance
//!     ↕
//! Session layer (this crate)  ← pure data structures
//! ```

mod policy;
mod queue;

pub use policy::ReconnectPolicy;
pub use queue::{MessageQueue, QueuedMessage};
