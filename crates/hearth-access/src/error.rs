//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::fmt;

use thiserror::Error;

/// Pipeline layer that produced a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialLayer {
    /// No role capability or override covered the request.
    Capability,
    /// A delegation lookup was decisive (reserved for administrative paths).
    Delegation,
    /// Cross-region block or an explicit deny policy.
    Region,
}

impl fmt::Display for DenialLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialLayer::Capability => write!(f, "capability"),
            DenialLayer::Delegation => write!(f, "delegation"),
            DenialLayer::Region => write!(f, "region"),
        }
    }
}

/// Errors surfaced by the authorization core.
///
/// Expired delegations and emergency grants never appear here; they are
/// ordinary non-matches inside their engines.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The bearer credential could not be verified or has expired.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    /// The resolved account is suspended.
    #[error("account inactive")]
    AccountInactive,
    /// No capability, delegation, or emergency coverage was found.
    #[error("authorization denied by {layer}: {reason}")]
    AuthorizationDenied {
        /// Layer that produced the denial.
        layer: DenialLayer,
        /// Human-readable reason, free of other users' delegation details.
        reason: String,
    },
    /// Cross-region block or explicit deny policy.
    #[error("regional policy violation: {reason}")]
    RegionalPolicyViolation {
        /// The policy's human-readable reason.
        reason: String,
    },
    /// Illegal lifecycle move.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity kind whose lifecycle was violated.
        entity: String,
        /// Current state label.
        from: String,
        /// Requested target label.
        to: String,
    },
    /// An audit append failed and the configured policy is fail-closed.
    #[error("audit write failure: {0}")]
    AuditWriteFailure(#[from] hearth_audit::AuditError),
    /// An emergency grant was not in the state the operation requires.
    #[error("emergency grant is {status}, expected {expected}")]
    GrantState {
        /// Actual grant status.
        status: String,
        /// Status the operation requires.
        expected: String,
    },
    /// The requester already holds a live emergency grant.
    #[error("requester already holds an active emergency grant")]
    GrantAlreadyActive,
    /// A delegation validity window was inverted at creation time.
    #[error("delegation window is inverted: valid_from is after valid_until")]
    InvertedWindow,
    /// Backing store failure.
    #[error("store error: {0}")]
    Store(String),
}
