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

use chrono::{DateTime, Duration, Utc};
use hearth_common::Clock;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::AccessError;
use crate::store::EmergencyGrantStore;

/// Identifier for an emergency grant.
pub type EmergencyGrantId = Uuid;

/// Lifecycle status of a break-glass grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyGrantStatus {
    /// Requested, awaiting approval.
    Pending,
    /// Approved; live until `expires_at`.
    Active,
    /// Marked after the expiry passed (bookkeeping only).
    Expired,
    /// Explicitly withdrawn.
    Revoked,
}

/// Break-glass authorization override.
///
/// A grant becomes inert the instant `expires_at` passes; no write is
/// needed for that to take effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyGrant {
    /// Stable identifier, recorded in every audit entry made under it.
    pub id: EmergencyGrantId,
    /// User the override covers.
    pub requester_id: String,
    /// Incident the override responds to.
    pub incident_ref: String,
    /// Free-text justification from the requester.
    pub justification: String,
    /// Lifecycle status.
    pub status: EmergencyGrantStatus,
    /// Approving user, set when activated.
    pub approver_id: Option<String>,
    /// Request timestamp.
    pub requested_at: DateTime<Utc>,
    /// Activation timestamp, set on approval.
    pub activated_at: Option<DateTime<Utc>>,
    /// Expiry timestamp, stamped as activation plus the configured window.
    pub expires_at: Option<DateTime<Utc>>,
}

impl EmergencyGrant {
    /// Whether the grant covers actions at the given instant.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EmergencyGrantStatus::Active
            && self.expires_at.is_some_and(|expiry| now < expiry)
    }
}

/// Break-glass request-time check plus the administrative grant workflow.
pub struct EmergencyAccessController {
    store: Arc<dyn EmergencyGrantStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl EmergencyAccessController {
    /// Build a controller; `window_minutes` bounds how long approvals live.
    pub fn new(
        store: Arc<dyn EmergencyGrantStore>,
        clock: Arc<dyn Clock>,
        window_minutes: i64,
    ) -> Self {
        Self {
            store,
            clock,
            window: Duration::minutes(window_minutes),
        }
    }

    /// Request break-glass access; the grant starts out pending.
    pub fn request(
        &self,
        requester_id: &str,
        incident_ref: &str,
        justification: &str,
    ) -> Result<EmergencyGrant, AccessError> {
        let grant = EmergencyGrant {
            id: Uuid::new_v4(),
            requester_id: requester_id.to_owned(),
            incident_ref: incident_ref.to_owned(),
            justification: justification.to_owned(),
            status: EmergencyGrantStatus::Pending,
            approver_id: None,
            requested_at: self.clock.now(),
            activated_at: None,
            expires_at: None,
        };
        self.store.insert(grant.clone())?;
        warn!(
            grant = %grant.id,
            requester = %grant.requester_id,
            incident = %grant.incident_ref,
            "emergency access requested"
        );
        Ok(grant)
    }

    /// Approve a pending grant, stamping activation and expiry.
    ///
    /// At most one live grant may exist per requester; a second approval
    /// while one is live is refused.
    pub fn approve(
        &self,
        grant_id: EmergencyGrantId,
        approver_id: &str,
    ) -> Result<EmergencyGrant, AccessError> {
        let now = self.clock.now();
        let mut grant = self
            .store
            .get(grant_id)?
            .ok_or_else(|| AccessError::Store(format!("unknown emergency grant {grant_id}")))?;
        if grant.status != EmergencyGrantStatus::Pending {
            return Err(AccessError::GrantState {
                status: format!("{:?}", grant.status).to_lowercase(),
                expected: "pending".into(),
            });
        }
        let already_live = self
            .store
            .grants_for_requester(&grant.requester_id)?
            .iter()
            .any(|existing| existing.id != grant.id && existing.is_live_at(now));
        if already_live {
            return Err(AccessError::GrantAlreadyActive);
        }

        grant.status = EmergencyGrantStatus::Active;
        grant.approver_id = Some(approver_id.to_owned());
        grant.activated_at = Some(now);
        grant.expires_at = Some(now + self.window);
        self.store.update(grant.clone())?;
        warn!(
            grant = %grant.id,
            requester = %grant.requester_id,
            approver = %approver_id,
            expires_at = %grant.expires_at.map(|e| e.to_rfc3339()).unwrap_or_default(),
            "emergency access approved"
        );
        Ok(grant)
    }

    /// Revoke a grant before its natural expiry.
    pub fn revoke(&self, grant_id: EmergencyGrantId) -> Result<bool, AccessError> {
        let Some(mut grant) = self.store.get(grant_id)? else {
            return Ok(false);
        };
        grant.status = EmergencyGrantStatus::Revoked;
        self.store.update(grant)?;
        warn!(grant = %grant_id, "emergency access revoked");
        Ok(true)
    }

    /// The grant currently covering an actor, for bypass and audit tagging.
    ///
    /// Liveness is evaluated here, at lookup time; no clock-driven job
    /// maintains it.
    pub fn active_grant(&self, actor_id: &str) -> Result<Option<EmergencyGrantId>, AccessError> {
        let now = self.clock.now();
        Ok(self
            .store
            .grants_for_requester(actor_id)?
            .iter()
            .find(|grant| grant.is_live_at(now))
            .map(|grant| grant.id))
    }

    /// Flip grants past expiry to `Expired` for bookkeeping.
    pub fn sweep_expired(&self) -> Result<usize, AccessError> {
        let now = self.clock.now();
        let mut flipped = 0;
        for grant in self.store.all()? {
            let past_expiry = grant.status == EmergencyGrantStatus::Active
                && grant.expires_at.is_some_and(|expiry| expiry <= now);
            if past_expiry {
                let mut grant = grant;
                grant.status = EmergencyGrantStatus::Expired;
                self.store.update(grant)?;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}
