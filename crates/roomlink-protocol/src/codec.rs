//! Codec trait and implementations for serializing/deserializing envelopes.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The connection core doesn't care HOW envelopes are serialized; it only
//! needs something that implements [`Codec`]. [`JsonCodec`] is the one the
//! game server speaks today.
//!
//! Swapping formats is a matter of handing a different codec to
//! `ConnectionManagerBuilder::build_with_codec`; the manager, queue and
//! registry never see bytes, only [`Envelope`]s.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Envelope, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: the codec is moved into the manager's actor task,
///   which Tokio may poll on any worker thread.
/// - `'static`: the codec owns everything it needs and borrows nothing
///   from the caller, because that task lives as long as the manager.
///
/// ## Generic methods
///
/// `encode<T: Serialize>` and `decode<T: DeserializeOwned>` work for any
/// serde type, not just [`Envelope`]. `DeserializeOwned` (rather than
/// `Deserialize<'de>`) means the decoded value owns its data, so the
/// inbound frame buffer can be dropped as soon as decoding returns.
///
/// ## Envelope validation
///
/// [`decode_envelope`](Self::decode_envelope) has a default body built on
/// `decode`, so an implementation only has to provide the two format
/// methods. Override it only if the format can validate more cheaply.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes an inbound frame and checks it is a conforming envelope.
    ///
    /// A frame without an `event` field fails inside `decode` already,
    /// because `Envelope::event` has no serde default. An empty string
    /// parses fine, so it is rejected here.
    ///
    /// # Errors
    /// `Decode` for unparseable frames or a missing `event`,
    /// `InvalidMessage` for an empty event name.
    fn decode_envelope(&self, data: &[u8]) -> Result<Envelope, ProtocolError> {
        // `?` hands a `ProtocolError::Decode` straight back to the caller.
        let envelope: Envelope = self.decode(data)?;
        if envelope.event.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "envelope event name is empty".into(),
            ));
        }
        Ok(envelope)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON is what the room server speaks, and it keeps frames readable in
/// logs and browser DevTools. An envelope encodes as a compact object with
/// exactly two keys, `{"event":"…","data":…}`, and is sent as a text frame.
///
/// ## Example
///
/// ```rust
/// use roomlink_protocol::{Codec, Envelope, JsonCodec};
/// use serde_json::json;
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new("move", json!({"row": 1, "col": 2}));
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded = codec.decode_envelope(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        // Writes straight into a `Vec<u8>`; no intermediate `String`.
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        // `&[u8]` is a borrowed view of the frame; parsing does not copy it.
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
