//! In-memory player registry.
//!
//! Holds the known players keyed by normalized UUID. Lookups take a read
//! lock, so many connection tasks can resolve roles at once; writers
//! (an admin command promoting someone, a reload) briefly take the write
//! lock.

use std::collections::HashMap;

use gatehouse_protocol::PlayerUuid;
use tokio::sync::RwLock;

use crate::{GateError, PlayerRecord, RoleResolver};

/// A [`RoleResolver`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerUuid, PlayerRecord>>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a player record. Returns the previous record
    /// for that UUID, if there was one.
    pub async fn insert(&self, record: PlayerRecord) -> Option<PlayerRecord> {
        let uuid = record.uuid.clone();
        let previous = self.players.write().await.insert(uuid.clone(), record);
        tracing::debug!(%uuid, replaced = previous.is_some(), "player record stored");
        previous
    }

    /// Removes a player record.
    pub async fn remove(&self, uuid: &PlayerUuid) -> Option<PlayerRecord> {
        self.players.write().await.remove(uuid)
    }

    /// Returns a copy of the record for `uuid`.
    pub async fn get(&self, uuid: &PlayerUuid) -> Option<PlayerRecord> {
        self.players.read().await.get(uuid).cloned()
    }

    /// Number of known players.
    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    /// Returns `true` if no players are known.
    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }
}

impl FromIterator<PlayerRecord> for PlayerRegistry {
    fn from_iter<I: IntoIterator<Item = PlayerRecord>>(iter: I) -> Self {
        let players = iter
            .into_iter()
            .map(|record| (record.uuid.clone(), record))
            .collect();
        Self {
            players: RwLock::new(players),
        }
    }
}

impl RoleResolver for PlayerRegistry {
    async fn lookup(&self, uuid: &PlayerUuid) -> Result<Option<PlayerRecord>, GateError> {
        Ok(self.get(uuid).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrivilegeTier;

    fn record(uuid: &str, tier: PrivilegeTier) -> PlayerRecord {
        PlayerRecord::new(PlayerUuid::new(uuid), uuid, tier)
    }

    #[tokio::test]
    async fn test_lookup_unknown_uuid_returns_none() {
        let registry = PlayerRegistry::new();
        let found = registry.lookup(&PlayerUuid::new("nobody")).await;
        assert!(matches!(found, Ok(None)));
    }

    #[tokio::test]
    async fn test_insert_then_lookup_returns_record() {
        let registry = PlayerRegistry::new();
        registry.insert(record("aa", PrivilegeTier::Moderator)).await;

        let found = registry
            .lookup(&PlayerUuid::new("aa"))
            .await
            .expect("registry never fails")
            .expect("should be known");
        assert_eq!(found.tier, PrivilegeTier::Moderator);
    }

    #[tokio::test]
    async fn test_lookup_matches_normalized_uuid() {
        let registry: PlayerRegistry =
            [record("ABCD", PrivilegeTier::Owner)].into_iter().collect();

        let found = registry.get(&PlayerUuid::new(" abcd ")).await;
        assert_eq!(found.map(|r| r.tier), Some(PrivilegeTier::Owner));
    }

    #[tokio::test]
    async fn test_insert_replaces_and_returns_previous() {
        let registry = PlayerRegistry::new();
        assert!(registry.insert(record("aa", PrivilegeTier::Guest)).await.is_none());

        let previous = registry.insert(record("aa", PrivilegeTier::Admin)).await;

        assert_eq!(previous.map(|r| r.tier), Some(PrivilegeTier::Guest));
        assert_eq!(registry.len().await, 1);
        assert_eq!(
            registry.get(&PlayerUuid::new("aa")).await.map(|r| r.tier),
            Some(PrivilegeTier::Admin)
        );
    }

    #[tokio::test]
    async fn test_remove_forgets_player() {
        let registry: PlayerRegistry =
            [record("aa", PrivilegeTier::Admin)].into_iter().collect();

        assert!(registry.remove(&PlayerUuid::new("aa")).await.is_some());
        assert!(registry.is_empty().await);
        assert!(registry.get(&PlayerUuid::new("aa")).await.is_none());
    }
}
