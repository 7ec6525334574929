//! Connect-time identity gate for Gatehouse.
//!
//! Player identifiers are self-reported. Anyone can claim to be the
//! server owner by copying their UUID. This crate decides, once per
//! connection and before any gameplay traffic flows, whether a claimed
//! identity is allowed in:
//!
//! 1. **Roles**: who holds which [`PrivilegeTier`] ([`RoleResolver`] trait,
//!    [`PlayerRegistry`])
//! 2. **Policy**: which secondary accounts privileged players must log in
//!    with ([`AuthConfig`] → [`AuthPolicy`], hot-swappable via [`PolicyHandle`])
//! 3. **Gate**: the decision itself ([`evaluate`], [`ConnectionGate`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Proxy (above)     ← rejects and closes, or relays upstream
//!     ↕
//! Auth (this crate) ← Accept / Reject(reason)
//!     ↕
//! Protocol (below)  ← PlayerUuid, ClientConnect
//! ```

mod error;
mod gate;
mod policy;
mod record;
mod registry;
mod resolver;

pub use error::GateError;
pub use gate::{ConnectionAttempt, ConnectionGate, Decision, RejectReason, decide, evaluate};
pub use policy::{AuthConfig, AuthPolicy, PolicyHandle};
pub use record::{PlayerRecord, PrivilegeTier};
pub use registry::PlayerRegistry;
pub use resolver::RoleResolver;
