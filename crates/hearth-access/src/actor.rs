//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::collections::HashMap;

use hearth_common::RegionCode;
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, Role};

/// Identifier for a user account.
pub type UserId = String;

/// Account status gating authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActorStatus {
    /// The account may authenticate and act.
    #[default]
    Active,
    /// The account is blocked from all privileged action.
    Suspended,
}

/// Durable user record held by the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identifier.
    pub id: UserId,
    /// Display name for attribution.
    pub display_name: String,
    /// Current role; authoritative over any role claim in a token.
    pub role: Role,
    /// Home region of the account.
    pub region: RegionCode,
    /// Whether the account can act.
    pub status: ActorStatus,
    /// Per-user capability overrides; `true` grants beyond the role defaults.
    #[serde(default)]
    pub capability_overrides: HashMap<Capability, bool>,
}

impl UserRecord {
    /// Short helper for constructing an active record.
    pub fn new(id: impl Into<UserId>, role: Role, region: RegionCode) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            role,
            region,
            status: ActorStatus::Active,
            capability_overrides: HashMap::new(),
        }
    }

    /// Attach a capability override.
    pub fn with_override(mut self, capability: Capability, granted: bool) -> Self {
        self.capability_overrides.insert(capability, granted);
        self
    }
}

/// Identity resolved for the duration of one request.
///
/// Loaded fresh per request and never mutated by the authorization layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Stable user identifier.
    pub id: UserId,
    /// Role at resolution time.
    pub role: Role,
    /// Home region of the account.
    pub region: RegionCode,
    /// Account status at resolution time.
    pub status: ActorStatus,
    /// Per-user capability overrides, immutable during the request.
    pub capability_overrides: HashMap<Capability, bool>,
}

impl Actor {
    /// Project a stored record into a request-scoped actor.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            role: record.role,
            region: record.region.clone(),
            status: record.status,
            capability_overrides: record.capability_overrides.clone(),
        }
    }

    /// Whether this actor bypasses the cross-region block.
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
