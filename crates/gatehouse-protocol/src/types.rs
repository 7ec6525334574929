//! Handshake-phase packet types.
//!
//! These are the only structures the proxy ever decodes. A client opens a
//! socket and sends [`Packet::ClientConnect`]; the proxy answers with
//! [`Packet::ConnectFailure`] if the identity check fails, otherwise it
//! forwards the original frame upstream untouched.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PlayerUuid
// ---------------------------------------------------------------------------

/// The stable identifier a client claims in its handshake.
///
/// Clients report this themselves, so on its own it proves nothing. The
/// value is normalized on construction (surrounding whitespace trimmed,
/// ASCII lowercased) so that the registry and incoming handshakes always
/// agree on spelling. Two byte strings that an upstream server would
/// treat as the same player can't slip past the gate as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PlayerUuid(String);

impl PlayerUuid {
    /// Creates a normalized identifier from text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    /// Decodes the raw identifier bytes from a handshake.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the bytes aren't
    /// valid UTF-8.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(raw).map_err(|e| {
            ProtocolError::InvalidMessage(format!("player uuid is not text: {e}"))
        })?;
        Ok(Self::new(text))
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PlayerUuid {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<PlayerUuid> for String {
    fn from(uuid: PlayerUuid) -> Self {
        uuid.0
    }
}

impl fmt::Display for PlayerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ClientConnect
// ---------------------------------------------------------------------------

/// The client's connect handshake.
///
/// `account` is a string set on the wire, but clients only ever put one
/// name in it. Buggy or hostile clients sometimes send it empty, omit it,
/// or send something that isn't a list of strings at all; every one of
/// those cases decodes to an empty list instead of failing the packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConnect {
    /// Raw identifier bytes. See [`PlayerUuid::from_bytes`].
    pub uuid: Vec<u8>,

    /// Display name. Purely cosmetic, never used for identity.
    #[serde(default)]
    pub name: String,

    /// Secondary account names presented by the client.
    #[serde(default, deserialize_with = "lenient_account")]
    pub account: Vec<String>,
}

impl ClientConnect {
    /// The account name the client logged in with, or `""` if none.
    pub fn account_name(&self) -> &str {
        self.account.first().map(String::as_str).unwrap_or("")
    }
}

/// Accepts a list of strings; anything else becomes an empty list.
fn lenient_account<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Account {
        Set(Vec<String>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Account::deserialize(deserializer)? {
        Account::Set(names) => names,
        Account::Other(_) => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// Packets exchanged before the connection is handed to the game server.
///
/// Internally tagged, so a failure notice looks like:
/// `{ "type": "ConnectFailure", "reason": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Packet {
    /// Client → Server: "This is who I am."
    ClientConnect(ClientConnect),

    /// Server → Client: "You're in."
    ConnectSuccess { server_time: u64 },

    /// Server → Client: "You're not getting in, and here's why."
    /// Always followed by the server closing the socket.
    ConnectFailure { reason: String },

    /// Either direction: "I'm leaving."
    Disconnect { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Packet {
        serde_json::from_str(json).expect("should decode")
    }

    fn connect(json: &str) -> ClientConnect {
        match decode(json) {
            Packet::ClientConnect(c) => c,
            other => panic!("expected ClientConnect, got {other:?}"),
        }
    }

    // =====================================================================
    // PlayerUuid
    // =====================================================================

    #[test]
    fn test_player_uuid_from_bytes_valid_text() {
        let uuid = PlayerUuid::from_bytes(b"0a1b2c").expect("valid");
        assert_eq!(uuid.as_str(), "0a1b2c");
    }

    #[test]
    fn test_player_uuid_from_bytes_invalid_utf8_returns_error() {
        let result = PlayerUuid::from_bytes(&[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_player_uuid_normalizes_case_and_whitespace() {
        assert_eq!(PlayerUuid::new("  ABCdef \n"), PlayerUuid::new("abcdef"));
        assert_eq!(
            PlayerUuid::from_bytes(b"ABCDEF ").unwrap(),
            PlayerUuid::new("abcdef")
        );
    }

    #[test]
    fn test_player_uuid_serde_is_plain_string() {
        let uuid: PlayerUuid = serde_json::from_str(r#""FFEE""#).unwrap();
        assert_eq!(uuid.as_str(), "ffee");
        assert_eq!(serde_json::to_string(&uuid).unwrap(), r#""ffee""#);
    }

    // =====================================================================
    // ClientConnect account field
    // =====================================================================

    #[test]
    fn test_client_connect_single_account() {
        let c = connect(
            r#"{"type":"ClientConnect","uuid":[97,98],"name":"Zed","account":["alice"]}"#,
        );
        assert_eq!(c.uuid, b"ab");
        assert_eq!(c.account_name(), "alice");
    }

    #[test]
    fn test_client_connect_uses_first_account_only() {
        let c = connect(
            r#"{"type":"ClientConnect","uuid":[97],"account":["alice","bob"]}"#,
        );
        assert_eq!(c.account_name(), "alice");
    }

    #[test]
    fn test_client_connect_empty_account_set_is_empty_name() {
        let c = connect(r#"{"type":"ClientConnect","uuid":[97],"account":[]}"#);
        assert_eq!(c.account_name(), "");
    }

    #[test]
    fn test_client_connect_missing_account_is_empty_name() {
        let c = connect(r#"{"type":"ClientConnect","uuid":[97]}"#);
        assert!(c.account.is_empty());
        assert_eq!(c.account_name(), "");
    }

    #[test]
    fn test_client_connect_malformed_account_is_empty_name() {
        // None of these are a list of strings; none of them may fail the packet.
        for account in [r#"null"#, r#"42"#, r#""alice""#, r#"[1,2]"#, r#"{"a":1}"#] {
            let c = connect(&format!(
                r#"{{"type":"ClientConnect","uuid":[97],"account":{account}}}"#
            ));
            assert_eq!(c.account_name(), "", "account = {account}");
        }
    }

    #[test]
    fn test_client_connect_missing_uuid_fails() {
        let result: Result<Packet, _> =
            serde_json::from_str(r#"{"type":"ClientConnect","account":["a"]}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // Packet tagging
    // =====================================================================

    #[test]
    fn test_packet_connect_failure_json_shape() {
        let json = serde_json::to_value(Packet::ConnectFailure {
            reason: "nope".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "ConnectFailure", "reason": "nope"}));
    }

    #[test]
    fn test_packet_disconnect_decodes() {
        assert_eq!(
            decode(r#"{"type":"Disconnect","reason":"bye"}"#),
            Packet::Disconnect {
                reason: "bye".into()
            }
        );
    }
}
