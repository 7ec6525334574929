//! Proxy configuration file.
//!
//! A single JSON document. Every field has a default, so an empty `{}`
//! is a valid (if useless: disabled, placeholder accounts) config.
//!
//! ```json
//! {
//!   "bind": "0.0.0.0:21025",
//!   "upstream": "ws://127.0.0.1:21024",
//!   "basic_auth": {
//!     "enabled": true,
//!     "staff_accounts": ["alice"],
//!     "owner_account": "bob"
//!   },
//!   "players": [
//!     { "uuid": "9f86d081884c7d65", "name": "Bob", "tier": "owner" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use gatehouse_auth::{AuthConfig, PlayerRecord, PlayerRegistry};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatehouseConfig {
    /// Address clients connect to.
    pub bind: String,

    /// WebSocket URL of the game server admitted clients are relayed to.
    pub upstream: String,

    /// How long a fresh connection may take to send its handshake.
    pub handshake_timeout_secs: u64,

    /// How long a relayed connection may stay silent in both directions.
    pub idle_timeout_secs: u64,

    /// Identity check policy.
    pub basic_auth: AuthConfig,

    /// Known players used to seed the in-memory registry.
    pub players: Vec<PlayerRecord>,
}

impl Default for GatehouseConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:21025".to_string(),
            upstream: "ws://127.0.0.1:21024".to_string(),
            handshake_timeout_secs: 5,
            idle_timeout_secs: 300,
            basic_auth: AuthConfig::default(),
            players: Vec::new(),
        }
    }
}

impl GatehouseConfig {
    /// Reads and parses a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), players = config.players.len(), "config loaded");
        Ok(config)
    }

    /// Parses a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Builds a registry holding the configured players.
    pub fn registry(&self) -> PlayerRegistry {
        self.players.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_auth::{AuthPolicy, PrivilegeTier};
    use gatehouse_protocol::PlayerUuid;

    use super::*;

    #[test]
    fn test_from_json_empty_object_uses_defaults() {
        let config = GatehouseConfig::from_json("{}").expect("valid");
        assert_eq!(config, GatehouseConfig::default());
        assert!(!config.basic_auth.enabled);
        assert_eq!(config.handshake_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_json_full_document() {
        let config = GatehouseConfig::from_json(
            r#"{
                "bind": "0.0.0.0:9000",
                "upstream": "ws://game:9001",
                "idle_timeout_secs": 10,
                "basic_auth": {
                    "enabled": true,
                    "staff_accounts": ["alice"],
                    "owner_account": "bob"
                },
                "players": [
                    {"uuid": "AA", "name": "Mod", "tier": "moderator"},
                    {"uuid": "bb", "tier": "owner"}
                ]
            }"#,
        )
        .expect("valid");

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout(), Duration::from_secs(10));
        let policy = AuthPolicy::from_config(config.basic_auth.clone());
        assert!(policy.is_staff_account("alice"));
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.players[0].uuid, PlayerUuid::new("aa"));
    }

    #[tokio::test]
    async fn test_registry_contains_configured_players() {
        let config = GatehouseConfig::from_json(
            r#"{"players":[{"uuid":"aa","tier":"admin"}]}"#,
        )
        .unwrap();
        let registry = config.registry();
        let record = registry.get(&PlayerUuid::new("AA")).await.expect("known");
        assert_eq!(record.tier, PrivilegeTier::Admin);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let result = GatehouseConfig::from_json(r#"{"bind": 12"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let result = GatehouseConfig::from_path("/definitely/not/here/gatehouse.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "gatehouse-config-test-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"upstream":"ws://10.0.0.1:1"}"#).unwrap();

        let config = GatehouseConfig::from_path(&path).expect("should load");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.upstream, "ws://10.0.0.1:1");
    }
}
