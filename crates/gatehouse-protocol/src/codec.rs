//! Codec trait and implementations for packet framing.
//!
//! The proxy decodes exactly one client frame (the connect handshake) and
//! encodes at most one reply of its own (a success or failure notice).
//! Which byte format those frames use is the codec's business, so the
//! handler is generic over [`Codec`] and only [`JsonCodec`] ships today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes packets to bytes and decodes bytes back into packets.
///
/// `Send + Sync + 'static` because a single codec value is shared by every
/// connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a single frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that frames packets as JSON documents (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use gatehouse_protocol::{Codec, JsonCodec, Packet};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&Packet::ConnectFailure { reason: "full".into() })
///     .unwrap();
/// let decoded: Packet = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Packet::ConnectFailure { reason: "full".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
