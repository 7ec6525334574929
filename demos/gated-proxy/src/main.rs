//! Runs a Gatehouse proxy from a JSON config file.
//!
//! ```text
//! gated-proxy [path/to/gatehouse.json]
//! ```
//!
//! Without a path the built-in defaults are used, which leave the identity
//! check disabled (and say so loudly). Log verbosity follows `RUST_LOG`
//! and defaults to `info`.

use gatehouse::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GatehouseConfig::from_path(path)?,
        None => {
            tracing::warn!("no config file given, using defaults");
            GatehouseConfig::default()
        }
    };

    let gate = ConnectionGate::activate(config.basic_auth.clone(), config.registry());
    let server = GatehouseServerBuilder::from_config(&config).build(gate).await?;

    tracing::info!(
        addr = %server.local_addr()?,
        upstream = %config.upstream,
        players = config.players.len(),
        "accepting clients"
    );
    server.run().await?;
    Ok(())
}
