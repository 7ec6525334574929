//! The connection gate: accept or reject a claimed identity.
//!
//! ```text
//!            ┌─ policy disabled ───────────────────────────→ Accept
//!  attempt ──┤
//!            └─ lookup(uuid) ─┬─ unknown ──────────────────→ Accept
//!                             ├─ Owner ─── owner account? ─→ Accept / Reject
//!                             ├─ ≥ Moderator ─ staff acct? → Accept / Reject
//!                             └─ below Moderator ──────────→ Accept
//! ```
//!
//! Tiers below Moderator are never asked for an account. They can be
//! spoofed too, but there's nothing there worth stealing and forcing every
//! regular player through account whitelisting isn't workable.
//!
//! Owner is checked on its own branch and never falls through to the
//! staff check: a compromised staff account must not unlock the owner.

use std::fmt;

use gatehouse_protocol::{ClientConnect, PlayerUuid, ProtocolError};

use crate::{AuthConfig, AuthPolicy, GateError, PlayerRecord, PolicyHandle, RoleResolver};

// ---------------------------------------------------------------------------
// ConnectionAttempt
// ---------------------------------------------------------------------------

/// What a connecting client claims about itself. Lives for one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttempt {
    pub uuid: PlayerUuid,

    /// The secondary account the client logged in with; `""` if none.
    pub account: String,
}

impl ConnectionAttempt {
    pub fn new(uuid: PlayerUuid, account: impl Into<String>) -> Self {
        Self {
            uuid,
            account: account.into(),
        }
    }

    /// Extracts the attempt from a decoded handshake.
    ///
    /// A missing or malformed account never fails here (it has already
    /// been normalized to an empty list during decoding). Only an
    /// identifier that isn't text does.
    pub fn from_handshake(connect: &ClientConnect) -> Result<Self, ProtocolError> {
        Ok(Self::new(
            PlayerUuid::from_bytes(&connect.uuid)?,
            connect.account_name(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Why a privileged identity was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The record is the owner and the account wasn't the owner account.
    OwnerAccountRequired,
    /// The record is staff and the account isn't on the staff list.
    StaffAccountRequired,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnerAccountRequired => {
                f.write_str("owner identity requires the designated owner account")
            }
            Self::StaffAccountRequired => {
                f.write_str("privileged identity requires a whitelisted staff account")
            }
        }
    }
}

/// The outcome of one connection attempt. Final: there are no retries on
/// the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(RejectReason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

// ---------------------------------------------------------------------------
// Policy core
// ---------------------------------------------------------------------------

/// Applies `policy` to an attempt whose record has already been looked up.
///
/// Synchronous and side-effect free; [`evaluate`] and
/// [`ConnectionGate::check`] are thin wrappers that do the lookup first.
pub fn decide(
    attempt: &ConnectionAttempt,
    policy: &AuthPolicy,
    record: Option<&PlayerRecord>,
) -> Decision {
    if !policy.is_enabled() {
        return Decision::Accept;
    }
    let Some(record) = record else {
        return Decision::Accept;
    };

    if record.tier.is_owner() {
        if policy.is_owner_account(&attempt.account) {
            Decision::Accept
        } else {
            Decision::Reject(RejectReason::OwnerAccountRequired)
        }
    } else if record.tier.is_at_least_moderator() {
        if policy.is_staff_account(&attempt.account) {
            Decision::Accept
        } else {
            Decision::Reject(RejectReason::StaffAccountRequired)
        }
    } else {
        Decision::Accept
    }
}

/// Resolves the claimed identity and applies `policy`.
///
/// When the policy is disabled the resolver is not consulted at all.
///
/// # Errors
/// Propagates [`GateError::ResolverUnavailable`]. It never turns a failed
/// lookup into `Accept`.
pub async fn evaluate<R: RoleResolver>(
    attempt: &ConnectionAttempt,
    policy: &AuthPolicy,
    resolver: &R,
) -> Result<Decision, GateError> {
    resolve(attempt, policy, resolver)
        .await
        .map(|(decision, _)| decision)
}

/// [`evaluate`], also handing back the record the decision was made on.
/// `None` when the policy is disabled or the identity is unknown.
async fn resolve<R: RoleResolver>(
    attempt: &ConnectionAttempt,
    policy: &AuthPolicy,
    resolver: &R,
) -> Result<(Decision, Option<PlayerRecord>), GateError> {
    if !policy.is_enabled() {
        return Ok((Decision::Accept, None));
    }
    let record = resolver.lookup(&attempt.uuid).await?;
    Ok((decide(attempt, policy, record.as_ref()), record))
}

// ---------------------------------------------------------------------------
// ConnectionGate
// ---------------------------------------------------------------------------

/// The gate as the server holds it: a resolver plus the live policy.
///
/// Shared by every connection task. It holds no per-connection state, so
/// concurrent checks don't interfere.
pub struct ConnectionGate<R> {
    resolver: R,
    policy: PolicyHandle,
}

impl<R: RoleResolver> ConnectionGate<R> {
    pub fn new(resolver: R, policy: PolicyHandle) -> Self {
        Self { resolver, policy }
    }

    /// Activates the policy from config (logging the disabled-mode
    /// warning if applicable) and wraps it around `resolver`.
    pub fn activate(config: AuthConfig, resolver: R) -> Self {
        Self::new(resolver, PolicyHandle::activate(config))
    }

    /// Handle for reloading the policy while the gate is running.
    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Evaluates `attempt` against the current policy snapshot and reports
    /// the outcome for privileged identities.
    pub async fn check(&self, attempt: &ConnectionAttempt) -> Result<Decision, GateError> {
        let policy = self.policy.snapshot();

        let (decision, record) = match resolve(attempt, &policy, &self.resolver).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    uuid = %attempt.uuid,
                    account = %attempt.account,
                    error = %e,
                    "role lookup failed, refusing connection"
                );
                return Err(e);
            }
        };

        if let Some(record) = record.filter(|r| r.tier.is_at_least_moderator()) {
            match decision {
                Decision::Accept => tracing::info!(
                    uuid = %attempt.uuid,
                    tier = %record.tier,
                    account = %attempt.account,
                    "privileged player authenticated"
                ),
                Decision::Reject(reason) => tracing::warn!(
                    uuid = %attempt.uuid,
                    tier = %record.tier,
                    account = %attempt.account,
                    %reason,
                    "privileged player FAILED to authenticate"
                ),
            }
        }

        Ok(decision)
    }
}
