//! Role lookup hook.
//!
//! Gatehouse doesn't own the player database. Whatever does (the game
//! server's own player store, a SQL table, a JSON file) plugs in by
//! implementing [`RoleResolver`]. The in-memory [`PlayerRegistry`]
//! is the stock implementation.
//!
//! [`PlayerRegistry`]: crate::PlayerRegistry

use gatehouse_protocol::PlayerUuid;

use crate::{GateError, PlayerRecord};

/// Resolves a claimed identifier to the record it belongs to, if any.
///
/// Called inline on the connect path, once per connection attempt, so
/// implementations should answer quickly. The gate imposes no timeout of
/// its own.
///
/// # Example
///
/// ```rust
/// use gatehouse_auth::{GateError, PlayerRecord, PrivilegeTier, RoleResolver};
/// use gatehouse_protocol::PlayerUuid;
///
/// /// Everyone named "root" is the owner. Don't do this.
/// struct Silly;
///
/// impl RoleResolver for Silly {
///     async fn lookup(
///         &self,
///         uuid: &PlayerUuid,
///     ) -> Result<Option<PlayerRecord>, GateError> {
///         Ok((uuid.as_str() == "root").then(|| {
///             PlayerRecord::new(uuid.clone(), "root", PrivilegeTier::Owner)
///         }))
///     }
/// }
/// ```
pub trait RoleResolver: Send + Sync + 'static {
    /// Looks up the record for `uuid`.
    ///
    /// # Returns
    /// - `Ok(Some(record))`: a known player
    /// - `Ok(None)`: never seen before; not an error
    /// - `Err(GateError::ResolverUnavailable)`: the backing store failed
    fn lookup(
        &self,
        uuid: &PlayerUuid,
    ) -> impl std::future::Future<Output = Result<Option<PlayerRecord>, GateError>> + Send;
}
