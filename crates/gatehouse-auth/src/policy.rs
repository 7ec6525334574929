//! Authentication policy: configuration, validated snapshots, and reload.
//!
//! The operator writes an [`AuthConfig`]. Activation turns it into an
//! immutable [`AuthPolicy`] and publishes it through a [`PolicyHandle`].
//! A reload publishes a brand new snapshot; nobody ever mutates a policy
//! in place, so an evaluation that grabbed a snapshot sees one consistent
//! policy from start to finish.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// The `basic_auth` section of the config file.
///
/// Defaults ship disabled, with placeholder account names that tell the
/// operator what to fill in. Placeholders are recognized and discarded
/// by [`AuthPolicy::from_config`]; they never work as real accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Master switch. When off every connection is admitted.
    pub enabled: bool,

    /// Accounts that moderator-and-above players (except the owner) may
    /// log in with.
    pub staff_accounts: Vec<String>,

    /// The one account the owner may log in with.
    pub owner_account: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            staff_accounts: vec![
                "-- REPLACE WITH A STAFF ACCOUNT NAME --".to_string(),
                "-- ADD ONE ENTRY PER STAFF ACCOUNT --".to_string(),
            ],
            owner_account: "-- REPLACE WITH THE OWNER ACCOUNT NAME --".to_string(),
        }
    }
}

/// `true` for empty names and for the `-- ... --` placeholders.
///
/// An empty account name is what a client sends when it has none, so it
/// must never be accepted as a configured account either.
fn is_placeholder(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || (name.starts_with("--") && name.ends_with("--"))
}

// ---------------------------------------------------------------------------
// AuthPolicy
// ---------------------------------------------------------------------------

/// A validated, immutable policy snapshot.
///
/// The owner account is deliberately kept apart from the staff set: a
/// staff account never satisfies the owner check, even if an operator
/// lists the same name in both places.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthPolicy {
    enabled: bool,
    staff_accounts: HashSet<String>,
    owner_account: Option<String>,
}

impl AuthPolicy {
    /// Builds a policy, dropping placeholder and empty account names.
    pub fn from_config(config: AuthConfig) -> Self {
        let staff_accounts = config
            .staff_accounts
            .into_iter()
            .filter(|name| !is_placeholder(name))
            .collect();
        let owner_account = Some(config.owner_account).filter(|name| !is_placeholder(name));

        Self {
            enabled: config.enabled,
            staff_accounts,
            owner_account,
        }
    }

    /// A policy that admits everyone.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Exact, case-sensitive membership in the staff set.
    pub fn is_staff_account(&self, account: &str) -> bool {
        self.staff_accounts.contains(account)
    }

    /// Exact, case-sensitive match against the owner account. Always
    /// `false` when no owner account is configured.
    pub fn is_owner_account(&self, account: &str) -> bool {
        self.owner_account.as_deref() == Some(account)
    }

    pub fn staff_accounts(&self) -> &HashSet<String> {
        &self.staff_accounts
    }

    pub fn owner_account(&self) -> Option<&str> {
        self.owner_account.as_deref()
    }

    /// Emits the operator-facing warnings for this snapshot.
    fn log_activation(&self) {
        if !self.enabled {
            for line in boxed_warning(&[
                "Privileged identity check is DISABLED!",
                "Anyone who copies a staff or owner UUID can log in",
                "as that player. Set basic_auth.enabled = true and",
                "list your staff accounts to close this hole.",
            ]) {
                tracing::warn!("{line}");
            }
            return;
        }

        tracing::debug!(
            staff_accounts = self.staff_accounts.len(),
            owner_account = self.owner_account.is_some(),
            "identity check enabled"
        );
        if self.staff_accounts.is_empty() {
            tracing::warn!("no staff accounts configured; every moderator login will be refused");
        }
        if self.owner_account.is_none() {
            tracing::warn!("no owner account configured; every owner login will be refused");
        }
    }
}

/// Draws a box around `lines` so the warning stands out in a log stream.
fn boxed_warning(lines: &[&str]) -> Vec<String> {
    const TITLE: &str = "< WARNING >";
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(TITLE.len());

    let dashes = width + 2 - TITLE.len();
    let left = dashes / 2;
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!(
        "+{}{TITLE}{}+",
        "-".repeat(left),
        "-".repeat(dashes - left)
    ));
    for line in lines {
        out.push(format!("| {line:<width$} |"));
    }
    out.push(format!("+{}+", "-".repeat(width + 2)));
    out
}

// ---------------------------------------------------------------------------
// PolicyHandle
// ---------------------------------------------------------------------------

/// Shared access to the current policy snapshot.
///
/// Cloning the handle is cheap and every clone sees reloads. Readers call
/// [`snapshot`](Self::snapshot) once per evaluation and keep that `Arc`;
/// a concurrent [`reload`](Self::reload) swaps the pointer without
/// touching the snapshot they hold.
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    tx: Arc<watch::Sender<Arc<AuthPolicy>>>,
}

impl PolicyHandle {
    /// Validates `config`, logs activation warnings, and publishes the
    /// first snapshot.
    pub fn activate(config: AuthConfig) -> Self {
        let policy = AuthPolicy::from_config(config);
        policy.log_activation();
        let (tx, _) = watch::channel(Arc::new(policy));
        Self { tx: Arc::new(tx) }
    }

    /// The policy in force right now.
    pub fn snapshot(&self) -> Arc<AuthPolicy> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replaces the policy with one built from `config`.
    ///
    /// Returns the snapshot that was replaced.
    pub fn reload(&self, config: AuthConfig) -> Arc<AuthPolicy> {
        let policy = AuthPolicy::from_config(config);
        policy.log_activation();
        let previous = self.tx.send_replace(Arc::new(policy));
        tracing::info!("auth policy reloaded");
        previous
    }

    /// Subscribes to policy changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AuthPolicy>> {
        self.tx.subscribe()
    }
}
