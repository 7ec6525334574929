//! Turning a client away.
//!
//! Two phases: [`build_rejection`] produces the bytes (pure, no I/O), then
//! [`reject_and_close`] writes them and closes the socket. The close
//! happens whether or not the write went through; the notice is a
//! courtesy, the disconnect is not optional. Both steps are bounded by
//! [`REJECTION_IO_TIMEOUT`] so a peer that stops reading can't pin the
//! task; past that the caller drops the connection.

use std::time::Duration;

use gatehouse_protocol::{Codec, Packet, ProtocolError};
use gatehouse_transport::{Connection, Frame};

/// Upper bound on each of the send and the close when turning a client away.
pub const REJECTION_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// First line of every identity-check failure, in the game's chat markup.
pub const UNAUTHORIZED_BANNER: &str = "^red;UNAUTHORIZED^reset;";

/// Encodes a `ConnectFailure` packet carrying `reason`.
pub fn build_rejection<C: Codec>(codec: &C, reason: &str) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(&Packet::ConnectFailure {
        reason: reason.to_string(),
    })
}

/// Formats the reason shown to a privileged player who failed the check.
pub fn unauthorized_reason(detail: impl std::fmt::Display) -> String {
    format!(
        "{UNAUTHORIZED_BANNER}\n{detail}.\nPrivileged players must log in with an \
         account listed in the proxy's configuration."
    )
}

/// Sends `notice` (best effort) and then closes `conn`.
///
/// Never fails: errors from either step are logged and swallowed since
/// there is nothing further the caller could do with the connection.
pub async fn reject_and_close<Conn: Connection>(conn: &Conn, notice: &[u8]) {
    match tokio::time::timeout(REJECTION_IO_TIMEOUT, conn.send(Frame::from(notice))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::debug!(conn_id = %conn.id(), error = %e, "rejection notice not delivered");
        }
        Err(_) => {
            tracing::debug!(conn_id = %conn.id(), "rejection notice timed out");
        }
    }
    close_quietly(conn).await;
}

async fn close_quietly<Conn: Connection>(conn: &Conn) {
    match tokio::time::timeout(REJECTION_IO_TIMEOUT, conn.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::debug!(conn_id = %conn.id(), error = %e, "close after rejection failed");
        }
        Err(_) => tracing::debug!(conn_id = %conn.id(), "close after rejection timed out"),
    }
}

/// Builds the rejection for `reason` and runs [`reject_and_close`].
///
/// If encoding fails the connection is closed without a notice.
pub async fn refuse<Conn: Connection, C: Codec>(conn: &Conn, codec: &C, reason: &str) {
    match build_rejection(codec, reason) {
        Ok(notice) => reject_and_close(conn, &notice).await,
        Err(e) => {
            tracing::debug!(conn_id = %conn.id(), error = %e, "cannot encode rejection");
            close_quietly(conn).await;
        }
    }
}
