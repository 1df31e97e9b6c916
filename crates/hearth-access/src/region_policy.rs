//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::sync::Arc;

use hearth_common::RegionCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::AccessError;
use crate::store::{RegionalPolicyStore, ResourceDirectory};

/// Effect of a residency policy on a matching action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyEffect {
    /// The action proceeds.
    Allow,
    /// The action is blocked with the policy's reason.
    Deny,
    /// The action proceeds only with recorded consent.
    RequireConsent,
}

/// Data-residency rule for a (region, resource type, action) triple.
///
/// At most one active policy is expected per triple; simultaneous
/// conflicting policies are a configuration error, not a runtime concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalPolicy {
    /// Stable identifier.
    pub id: Uuid,
    /// Region the resource must reside in for the policy to apply.
    pub region: RegionCode,
    /// Resource type the policy covers.
    pub resource_type: String,
    /// Action name the policy covers.
    pub action: String,
    /// Effect applied on match.
    pub effect: PolicyEffect,
    /// Structured condition predicate; opaque here, may be empty.
    #[serde(default)]
    pub condition: serde_json::Value,
    /// Human-readable reason surfaced on deny.
    pub reason: String,
    /// Whether the policy is in force.
    pub active: bool,
}

impl RegionalPolicy {
    /// Build an active policy with an empty condition.
    pub fn new(
        region: RegionCode,
        resource_type: impl Into<String>,
        action: impl Into<String>,
        effect: PolicyEffect,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            region,
            resource_type: resource_type.into(),
            action: action.into(),
            effect,
            condition: serde_json::Value::Null,
            reason: reason.into(),
            active: true,
        }
    }
}

/// Outcome of a regional check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionDecision {
    /// No regional restriction applies.
    Allowed,
    /// The action may proceed once consent is recorded.
    AllowedWithConsent {
        /// The policy's reason text.
        reason: String,
    },
    /// The action is blocked.
    Denied {
        /// Cross-region or policy reason text.
        reason: String,
    },
}

impl RegionDecision {
    /// Whether the action may proceed (with or without consent).
    pub fn allowed(&self) -> bool {
        !matches!(self, RegionDecision::Denied { .. })
    }

    /// Reason text for denied or consent-gated outcomes.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RegionDecision::Allowed => None,
            RegionDecision::AllowedWithConsent { reason } => Some(reason),
            RegionDecision::Denied { reason } => Some(reason),
        }
    }

    /// Convert into a result, mapping a block to
    /// [`AccessError::RegionalPolicyViolation`] for handlers that abort on it.
    pub fn into_result(self) -> Result<RegionDecision, AccessError> {
        match self {
            RegionDecision::Denied { reason } => {
                Err(AccessError::RegionalPolicyViolation { reason })
            }
            other => Ok(other),
        }
    }
}

/// Region compatibility check plus the policy overlay.
pub struct RegionalPolicyEngine {
    policies: Arc<dyn RegionalPolicyStore>,
    directory: Arc<dyn ResourceDirectory>,
    baseline: RegionCode,
}

impl RegionalPolicyEngine {
    /// Build an engine over a policy store and a resource directory.
    pub fn new(
        policies: Arc<dyn RegionalPolicyStore>,
        directory: Arc<dyn ResourceDirectory>,
        baseline: RegionCode,
    ) -> Self {
        Self {
            policies,
            directory,
            baseline,
        }
    }

    /// Resolve a resource's region, falling back to the baseline.
    pub fn resolve_region(
        &self,
        resource_type: &str,
        resource_id: Option<&str>,
    ) -> Result<RegionCode, AccessError> {
        let resolved = match resource_id {
            Some(id) => self.directory.resource_region(resource_type, id)?,
            None => None,
        };
        Ok(resolved.unwrap_or_else(|| self.baseline.clone()))
    }

    /// Evaluate both regional layers for an action.
    ///
    /// Layer one blocks cross-region access for everyone but super-admins;
    /// layer two applies the policy overlay for the resource's region.
    /// Break-glass bypass happens in the pipeline, not here.
    pub fn check(
        &self,
        actor: &Actor,
        resource_type: &str,
        resource_id: Option<&str>,
        action: &str,
    ) -> Result<RegionDecision, AccessError> {
        let resource_region = self.resolve_region(resource_type, resource_id)?;

        if actor.region != resource_region && !actor.is_super_admin() {
            return Ok(RegionDecision::Denied {
                reason: format!(
                    "cross-region access from {} to {} is not permitted",
                    actor.region, resource_region
                ),
            });
        }

        match self
            .policies
            .policy_for(&resource_region, resource_type, action)?
        {
            Some(policy) => Ok(match policy.effect {
                PolicyEffect::Allow => RegionDecision::Allowed,
                PolicyEffect::Deny => RegionDecision::Denied {
                    reason: policy.reason,
                },
                PolicyEffect::RequireConsent => RegionDecision::AllowedWithConsent {
                    reason: policy.reason,
                },
            }),
            None => Ok(RegionDecision::Allowed),
        }
    }
}
