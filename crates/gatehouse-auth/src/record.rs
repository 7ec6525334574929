//! Player records: who a known identifier belongs to and what it may do.

use std::fmt;

use gatehouse_protocol::PlayerUuid;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PrivilegeTier
// ---------------------------------------------------------------------------

/// The access level bound to a known identifier.
///
/// Variants are declared lowest to highest, so the derived `Ord` gives
/// the total order `Guest < Registered < Moderator < Admin < SuperAdmin < Owner`.
/// A record holds exactly one tier; there are no role combinations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeTier {
    #[default]
    Guest,
    Registered,
    Moderator,
    Admin,
    SuperAdmin,
    Owner,
}

impl PrivilegeTier {
    /// Exactly the owner tier.
    pub fn is_owner(self) -> bool {
        self == Self::Owner
    }

    /// Moderator or anything ranked above it, owner included.
    pub fn is_at_least_moderator(self) -> bool {
        self >= Self::Moderator
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Guest => "guest",
            Self::Registered => "registered",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// A previously known player, as stored in the registry.
///
/// The gate only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub uuid: PlayerUuid,

    /// Last known display name. Informational only.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tier: PrivilegeTier,
}

impl PlayerRecord {
    pub fn new(uuid: PlayerUuid, name: impl Into<String>, tier: PrivilegeTier) -> Self {
        Self {
            uuid,
            name: name.into(),
            tier,
        }
    }
}
