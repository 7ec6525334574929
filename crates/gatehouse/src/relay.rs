//! Frame pump between an admitted client and the upstream game server.
//!
//! Once the gate says yes the proxy no longer cares what's inside the
//! frames; it copies them across, one at a time, in whichever direction
//! has data first.

use std::time::Duration;

use gatehouse_transport::{Connection, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

/// Frame counts for one relayed session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RelayStats {
    pub(crate) upstream_frames: u64,
    pub(crate) downstream_frames: u64,
}

/// Copies frames both ways until either side closes, an error occurs, or
/// nothing moves for `idle_timeout`.
///
/// Does not close either connection; the caller owns that.
pub(crate) async fn relay<A, B>(
    client: &A,
    upstream: &B,
    idle_timeout: Duration,
) -> Result<RelayStats, TransportError>
where
    A: Connection<Error = TransportError>,
    B: Connection<Error = TransportError>,
{
    let mut stats = RelayStats::default();

    loop {
        let next = tokio::time::timeout(idle_timeout, async {
            tokio::select! {
                frame = client.recv() => (Direction::Upstream, frame),
                frame = upstream.recv() => (Direction::Downstream, frame),
            }
        })
        .await;

        let (direction, frame) = match next {
            Ok(step) => step,
            Err(_) => {
                tracing::info!(client = %client.id(), "relay idle, closing");
                break;
            }
        };

        match (direction, frame?) {
            (Direction::Upstream, Some(frame)) => {
                upstream.send(frame).await?;
                stats.upstream_frames += 1;
            }
            (Direction::Downstream, Some(frame)) => {
                client.send(frame).await?;
                stats.downstream_frames += 1;
            }
            (direction, None) => {
                tracing::debug!(client = %client.id(), ?direction, "peer closed");
                break;
            }
        }
    }

    Ok(stats)
}
