//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a packet into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a packet).
    ///
    /// Common causes: malformed JSON, an unknown packet `type`, or a
    /// truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The packet decoded but violates protocol rules, e.g. a player
    /// identifier that isn't valid text.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
