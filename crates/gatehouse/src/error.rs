//! Unified error type for the Gatehouse proxy.

use std::path::PathBuf;

use gatehouse_auth::GateError;
use gatehouse_protocol::ProtocolError;
use gatehouse_transport::TransportError;

/// Failure to load the proxy configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file couldn't be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file isn't valid JSON for [`GatehouseConfig`](crate::GatehouseConfig).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    /// A transport-level error (bind, accept, send, recv, dial).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (undecodable or unexpected handshake).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The identity check could not reach a decision.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
