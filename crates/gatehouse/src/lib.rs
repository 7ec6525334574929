//! # Gatehouse
//!
//! A WebSocket front door for multiplayer game servers that stops players
//! from impersonating staff.
//!
//! Game clients announce their identity with a self-reported UUID. Copy a
//! moderator's UUID and you are that moderator. Gatehouse sits in front of
//! the game server, reads each client's connect handshake, and admits a
//! privileged identity only if the client also logged in with one of the
//! secondary accounts the operator approved. Everyone else passes straight
//! through to the game server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gatehouse::prelude::*;
//!
//! # async fn run() -> Result<(), GatehouseError> {
//! let config = GatehouseConfig::from_path("gatehouse.json")?;
//! let gate = ConnectionGate::activate(config.basic_auth.clone(), config.registry());
//! let server = GatehouseServerBuilder::from_config(&config).build(gate).await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod rejection;
mod relay;
mod server;

pub use config::GatehouseConfig;
pub use error::{ConfigError, GatehouseError};
pub use server::{GatehouseServer, GatehouseServerBuilder};

/// Everything needed to configure and run a proxy.
pub mod prelude {
    pub use gatehouse_auth::{
        AuthConfig, AuthPolicy, ConnectionAttempt, ConnectionGate, Decision, GateError,
        PlayerRecord, PlayerRegistry, PolicyHandle, PrivilegeTier, RejectReason, RoleResolver,
    };
    pub use gatehouse_protocol::{ClientConnect, Codec, JsonCodec, Packet, PlayerUuid};

    pub use crate::{
        ConfigError, GatehouseConfig, GatehouseError, GatehouseServer, GatehouseServerBuilder,
    };
}
