//! Per-connection handler: handshake, identity check, relay.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   0. Finish the WebSocket upgrade, bounded by the handshake timeout
//!   1. Receive the first frame → must decode as `ClientConnect`
//!   2. Run the identity gate → Accept or Reject
//!   3. Reject: send `ConnectFailure`, close. Done.
//!   4. Accept: dial upstream, forward the handshake frame as received
//!      (same bytes, same text/binary kind),
//!      then relay frames both ways until someone hangs up.
//!
//! Nothing past the first frame is read from the client until the gate
//! has decided.

use std::sync::Arc;

use gatehouse_auth::{ConnectionAttempt, Decision, RoleResolver};
use gatehouse_protocol::{Codec, Packet, ProtocolError};
use gatehouse_transport::{
    Connection, Frame, PendingConnection, Transport, TransportError, UpstreamConnection,
    WebSocketConnection, WebSocketTransport,
};

use crate::GatehouseError;
use crate::rejection::{refuse, unauthorized_reason};
use crate::relay::relay;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<R, C>(
    pending: PendingConnection,
    state: Arc<ServerState<R, C>>,
) -> Result<(), GatehouseError>
where
    R: RoleResolver,
    C: Codec,
{
    let peer = pending.peer_addr();
    let upgrade = WebSocketTransport::upgrade(pending);
    let conn = match tokio::time::timeout(state.handshake_timeout, upgrade).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "websocket upgrade failed");
            return Err(e.into());
        }
        Err(_) => {
            tracing::debug!(%peer, "websocket upgrade timed out");
            return Err(TransportError::ConnectionClosed("upgrade timed out".into()).into());
        }
    };

    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Handshake ---
    let handshake = match receive_handshake(&conn, &state).await {
        Ok(frame) => frame,
        Err(e) => {
            refuse(&conn, &state.codec, "handshake not received").await;
            return Err(e);
        }
    };

    let attempt = match parse_attempt(&state.codec, handshake.as_bytes()) {
        Ok(attempt) => attempt,
        Err(Refusal { reason, error }) => {
            tracing::debug!(%conn_id, error = %error, "bad handshake");
            refuse(&conn, &state.codec, reason).await;
            return Err(error.into());
        }
    };

    // --- Step 2: Identity gate ---
    match state.gate.check(&attempt).await {
        Ok(Decision::Accept) => {}
        Ok(Decision::Reject(reason)) => {
            refuse(&conn, &state.codec, &unauthorized_reason(reason)).await;
            return Ok(());
        }
        Err(e) => {
            refuse(&conn, &state.codec, "identity check unavailable, try again later").await;
            return Err(e.into());
        }
    }

    tracing::info!(%conn_id, uuid = %attempt.uuid, "player admitted");

    // --- Step 3: Hand over to the game server ---
    let upstream = match UpstreamConnection::connect(&state.upstream).await {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!(%conn_id, error = %e, "upstream unreachable");
            refuse(&conn, &state.codec, "game server unavailable").await;
            return Err(e.into());
        }
    };

    let result = match upstream.send(handshake).await {
        Ok(()) => relay(&conn, &upstream, state.idle_timeout).await,
        Err(e) => Err(e),
    };

    if let Err(e) = upstream.close().await {
        tracing::debug!(%conn_id, upstream = %upstream.id(), error = %e, "upstream close failed");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "client close failed");
    }

    let stats = result?;
    tracing::debug!(
        %conn_id,
        up = stats.upstream_frames,
        down = stats.downstream_frames,
        "relay finished"
    );
    Ok(())
}

/// Waits for the first frame, bounded by the handshake timeout.
async fn receive_handshake<R, C>(
    conn: &WebSocketConnection,
    state: &ServerState<R, C>,
) -> Result<Frame, GatehouseError> {
    match tokio::time::timeout(state.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => Ok(data),
        Ok(Ok(None)) => Err(ProtocolError::InvalidMessage(
            "connection closed before handshake".into(),
        )
        .into()),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(ProtocolError::InvalidMessage("handshake timed out".into()).into()),
    }
}

/// Why a handshake frame couldn't become a [`ConnectionAttempt`], and what
/// to tell the client about it.
struct Refusal {
    reason: &'static str,
    error: ProtocolError,
}

fn parse_attempt<C: Codec>(codec: &C, frame: &[u8]) -> Result<ConnectionAttempt, Refusal> {
    let connect = match codec.decode::<Packet>(frame) {
        Ok(Packet::ClientConnect(connect)) => connect,
        Ok(_) => {
            return Err(Refusal {
                reason: "expected ClientConnect",
                error: ProtocolError::InvalidMessage("first packet must be ClientConnect".into()),
            });
        }
        Err(error) => {
            return Err(Refusal {
                reason: "expected ClientConnect",
                error,
            });
        }
    };

    ConnectionAttempt::from_handshake(&connect).map_err(|error| Refusal {
        reason: "malformed identifier",
        error,
    })
}

#[cfg(test)]
mod tests {
    use gatehouse_protocol::{JsonCodec, PlayerUuid};

    use super::*;

    fn parse(json: &str) -> Result<ConnectionAttempt, Refusal> {
        parse_attempt(&JsonCodec, json.as_bytes())
    }

    #[test]
    fn test_parse_attempt_client_connect() {
        let attempt = parse(r#"{"type":"ClientConnect","uuid":[65,66],"account":["alice"]}"#)
            .ok()
            .expect("should parse");
        assert_eq!(attempt.uuid, PlayerUuid::new("ab"));
        assert_eq!(attempt.account, "alice");
    }

    #[test]
    fn test_parse_attempt_other_packet_is_refused() {
        let refusal = parse(r#"{"type":"Disconnect","reason":"x"}"#).err().expect("refused");
        assert_eq!(refusal.reason, "expected ClientConnect");
    }

    #[test]
    fn test_parse_attempt_garbage_is_refused() {
        let refusal = parse("not json at all").err().expect("refused");
        assert_eq!(refusal.reason, "expected ClientConnect");
        assert!(matches!(refusal.error, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_parse_attempt_non_text_uuid_is_refused() {
        let refusal = parse(r#"{"type":"ClientConnect","uuid":[255,254]}"#)
            .err()
            .expect("refused");
        assert_eq!(refusal.reason, "malformed identifier");
    }
}
