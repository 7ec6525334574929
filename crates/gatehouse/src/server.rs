//! `GatehouseServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → auth gate → relay.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_auth::{ConnectionGate, PolicyHandle, RoleResolver};
use gatehouse_protocol::{Codec, JsonCodec};
use gatehouse_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{GatehouseConfig, GatehouseError};

/// Shared server state passed to each connection handler task.
///
/// Nothing in here is mutated per connection. The only thing that
/// changes at runtime is the policy, and that goes through the gate's
/// snapshot handle.
pub(crate) struct ServerState<R, C> {
    pub(crate) gate: ConnectionGate<R>,
    pub(crate) codec: C,
    pub(crate) upstream: String,
    pub(crate) handshake_timeout: Duration,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Gatehouse proxy.
///
/// # Example
///
/// ```rust,no_run
/// use gatehouse::prelude::*;
///
/// # async fn run() -> Result<(), GatehouseError> {
/// let gate = ConnectionGate::activate(AuthConfig::default(), PlayerRegistry::new());
/// let server = GatehouseServer::builder()
///     .bind("0.0.0.0:21025")
///     .upstream("ws://127.0.0.1:21024")
///     .build(gate)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GatehouseServerBuilder {
    bind_addr: String,
    upstream: String,
    handshake_timeout: Duration,
    idle_timeout: Duration,
}

impl GatehouseServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(&GatehouseConfig::default())
    }

    /// Takes addresses and timeouts from a loaded config file.
    pub fn from_config(config: &GatehouseConfig) -> Self {
        Self {
            bind_addr: config.bind.clone(),
            upstream: config.upstream.clone(),
            handshake_timeout: config.handshake_timeout(),
            idle_timeout: config.idle_timeout(),
        }
    }

    /// Sets the address to accept clients on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the WebSocket URL of the game server.
    pub fn upstream(mut self, url: &str) -> Self {
        self.upstream = url.to_string();
        self
    }

    /// How long a client may take to finish the WebSocket upgrade, and
    /// then again to send its handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// How long a relayed session may be silent before it's dropped.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and assembles the server around `gate`.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<R: RoleResolver>(
        self,
        gate: ConnectionGate<R>,
    ) -> Result<GatehouseServer<R, JsonCodec>, GatehouseError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            gate,
            codec: JsonCodec,
            upstream: self.upstream,
            handshake_timeout: self.handshake_timeout,
            idle_timeout: self.idle_timeout,
        });

        Ok(GatehouseServer { transport, state })
    }
}

impl Default for GatehouseServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gatehouse proxy.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GatehouseServer<R, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<R, C>>,
}

impl GatehouseServer<(), JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GatehouseServerBuilder {
        GatehouseServerBuilder::new()
    }
}

impl<R, C> GatehouseServer<R, C>
where
    R: RoleResolver,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle for swapping the auth policy while the server runs.
    pub fn policy(&self) -> PolicyHandle {
        self.state.gate.policy().clone()
    }

    /// Runs the accept loop.
    ///
    /// The loop only takes sockets off the listener. The WebSocket upgrade
    /// and everything after it run on a task per connection, so one peer
    /// that never finishes its upgrade can't hold up the next. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), GatehouseError> {
        tracing::info!(upstream = %self.state.upstream, "Gatehouse proxy running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
