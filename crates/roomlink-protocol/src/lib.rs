//! Wire protocol for roomlink.
//!
//! This crate defines the "language" the client core and the game server
//! speak:
//!
//! - **Types** ([`Envelope`], reserved and lifecycle event names, lifecycle
//!   payloads): the records that travel on the wire or to subscribers.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Connection core (events)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ConnectionFailedInfo, Envelope, MessageFailedInfo, MessageQueuedInfo,
    ProbePayload, ReconnectingInfo, lifecycle, reserved,
};
