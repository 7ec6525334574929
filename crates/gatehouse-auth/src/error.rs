//! Error types for the auth layer.
//!
//! Note what is *not* here: a failed login is a [`Decision`](crate::Decision),
//! not an error. Errors are reserved for the gate being unable to decide.

/// Errors that prevent the gate from reaching a decision.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The role registry could not be consulted. Callers must treat this
    /// as a rejection.
    #[error("role resolver unavailable: {0}")]
    ResolverUnavailable(String),
}
