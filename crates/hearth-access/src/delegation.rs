//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hearth_common::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::capability::Capability;
use crate::error::AccessError;
use crate::store::DelegationStore;

/// Identifier for a delegation.
pub type DelegationId = Uuid;

/// Lifecycle status of a delegation.
///
/// `Expired` is bookkeeping only: a delegation past `valid_until` is
/// non-matching whether or not the sweep has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegationStatus {
    /// Usable while the validity window holds.
    Active,
    /// Explicitly revoked by an administrator or the grantor.
    Revoked,
    /// Marked by the background sweep after `valid_until` passed.
    Expired,
}

/// Resource constraint attached to a delegation.
///
/// An empty scope matches any resource; a populated scope requires the
/// request's resource id to be one of the named property ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationScope {
    /// Property ids the delegation is limited to, if any.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub property_ids: BTreeSet<String>,
}

impl DelegationScope {
    /// Scope matching any resource.
    pub fn any() -> Self {
        Self::default()
    }

    /// Scope restricted to a set of property ids.
    pub fn properties<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            property_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a request's resource id satisfies this scope.
    pub fn matches(&self, resource_id: Option<&str>) -> bool {
        if self.property_ids.is_empty() {
            return true;
        }
        resource_id.is_some_and(|id| self.property_ids.contains(id))
    }
}

/// Time-boxed, scope-limited transfer of capabilities between users.
///
/// Never deleted; revocation and expiry are status changes kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    /// Stable identifier; also the deterministic match order.
    pub id: DelegationId,
    /// User who granted the delegation.
    pub grantor_id: String,
    /// User who received it.
    pub grantee_id: String,
    /// Optional role label describing the granted function.
    pub role_label: Option<String>,
    /// Resource constraint.
    pub scope: DelegationScope,
    /// Capabilities transferred.
    pub permissions: BTreeSet<Capability>,
    /// Start of the validity window (inclusive).
    pub valid_from: DateTime<Utc>,
    /// End of the validity window (inclusive).
    pub valid_until: DateTime<Utc>,
    /// Lifecycle status.
    pub status: DelegationStatus,
    /// Free-text reason supplied at creation.
    pub reason: String,
}

impl Delegation {
    /// Whether the delegation can satisfy requests at the given instant.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == DelegationStatus::Active
            && self.valid_from <= now
            && now <= self.valid_until
    }

    /// Whether the delegation transfers the capability for the resource.
    pub fn covers(&self, capability: Capability, resource_id: Option<&str>) -> bool {
        self.permissions.contains(&capability) && self.scope.matches(resource_id)
    }
}

/// Parameters for creating a delegation.
#[derive(Debug, Clone)]
pub struct NewDelegation {
    /// Granting user.
    pub grantor_id: String,
    /// Receiving user.
    pub grantee_id: String,
    /// Optional role label.
    pub role_label: Option<String>,
    /// Resource constraint.
    pub scope: DelegationScope,
    /// Capabilities to transfer.
    pub permissions: BTreeSet<Capability>,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_until: DateTime<Utc>,
    /// Free-text reason.
    pub reason: String,
}

/// Matches requests against active delegations and manages their lifecycle.
pub struct DelegationEngine {
    store: Arc<dyn DelegationStore>,
    clock: Arc<dyn Clock>,
}

impl DelegationEngine {
    /// Build an engine over a delegation store.
    pub fn new(store: Arc<dyn DelegationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Find the first active delegation covering the request.
    ///
    /// Candidates are ordered by id ascending so the match is
    /// deterministic. Returns the delegation id for audit attribution, or
    /// `None` when authorization should fall through to the static
    /// capability check.
    pub fn find_covering(
        &self,
        grantee_id: &str,
        capability: Capability,
        resource_id: Option<&str>,
    ) -> Result<Option<DelegationId>, AccessError> {
        let now = self.clock.now();
        let mut candidates = self.store.delegations_for_grantee(grantee_id)?;
        candidates.sort_by_key(|delegation| delegation.id);
        Ok(candidates
            .iter()
            .find(|delegation| {
                delegation.is_usable_at(now) && delegation.covers(capability, resource_id)
            })
            .map(|delegation| delegation.id))
    }

    /// Create a delegation; the validity window must not be inverted.
    pub fn create(&self, new: NewDelegation) -> Result<Delegation, AccessError> {
        if new.valid_from > new.valid_until {
            return Err(AccessError::InvertedWindow);
        }
        let delegation = Delegation {
            id: Uuid::new_v4(),
            grantor_id: new.grantor_id,
            grantee_id: new.grantee_id,
            role_label: new.role_label,
            scope: new.scope,
            permissions: new.permissions,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            status: DelegationStatus::Active,
            reason: new.reason,
        };
        self.store.insert(delegation.clone())?;
        info!(
            delegation = %delegation.id,
            grantor = %delegation.grantor_id,
            grantee = %delegation.grantee_id,
            "delegation created"
        );
        Ok(delegation)
    }

    /// Revoke a delegation. Returns false when the id is unknown.
    pub fn revoke(&self, id: DelegationId) -> Result<bool, AccessError> {
        let changed = self.store.update_status(id, DelegationStatus::Revoked)?;
        if changed {
            info!(delegation = %id, "delegation revoked");
        }
        Ok(changed)
    }

    /// Flip delegations past their window to `Expired`.
    ///
    /// Bookkeeping only: matching never depends on this sweep having run.
    pub fn sweep_expired(&self) -> Result<usize, AccessError> {
        let now = self.clock.now();
        let mut flipped = 0;
        for delegation in self.store.all()? {
            if delegation.status == DelegationStatus::Active && delegation.valid_until < now {
                if self.store.update_status(delegation.id, DelegationStatus::Expired)? {
                    flipped += 1;
                }
            }
        }
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDelegationStore;
    use chrono::Duration;
    use hearth_common::FixedClock;

    fn engine_with_clock(clock: Arc<FixedClock>) -> (DelegationEngine, Arc<MemoryDelegationStore>) {
        let store = Arc::new(MemoryDelegationStore::default());
        (DelegationEngine::new(store.clone(), clock), store)
    }

    fn delegation_for(engine: &DelegationEngine, now: DateTime<Utc>) -> Delegation {
        engine
            .create(NewDelegation {
                grantor_id: "2".into(),
                grantee_id: "5".into(),
                role_label: Some("approver".into()),
                scope: DelegationScope::properties(["12"]),
                permissions: BTreeSet::from([Capability::ApproveQuotation]),
                valid_from: now,
                valid_until: now + Duration::hours(1),
                reason: "vacation cover".into(),
            })
            .unwrap()
    }

    #[test]
    fn scoped_delegation_matches_only_named_property() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, _store) = engine_with_clock(clock);
        let delegation = delegation_for(&engine, now);

        let covered = engine
            .find_covering("5", Capability::ApproveQuotation, Some("12"))
            .unwrap();
        assert_eq!(covered, Some(delegation.id));

        assert!(engine
            .find_covering("5", Capability::ApproveQuotation, Some("13"))
            .unwrap()
            .is_none());
        assert!(engine
            .find_covering("5", Capability::ApproveQuotation, None)
            .unwrap()
            .is_none());
        assert!(engine
            .find_covering("5", Capability::RecordPayment, Some("12"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn empty_scope_matches_any_resource() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, _store) = engine_with_clock(clock);
        engine
            .create(NewDelegation {
                grantor_id: "2".into(),
                grantee_id: "5".into(),
                role_label: None,
                scope: DelegationScope::any(),
                permissions: BTreeSet::from([Capability::SendMessage]),
                valid_from: now,
                valid_until: now + Duration::hours(1),
                reason: "broad cover".into(),
            })
            .unwrap();

        assert!(engine
            .find_covering("5", Capability::SendMessage, Some("99"))
            .unwrap()
            .is_some());
        assert!(engine
            .find_covering("5", Capability::SendMessage, None)
            .unwrap()
            .is_some());
    }

    #[test]
    fn expiry_is_evaluated_at_read_time() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, _store) = engine_with_clock(clock.clone());
        delegation_for(&engine, now);

        assert!(engine
            .find_covering("5", Capability::ApproveQuotation, Some("12"))
            .unwrap()
            .is_some());

        clock.set(now + Duration::hours(2));
        assert!(engine
            .find_covering("5", Capability::ApproveQuotation, Some("12"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn revoked_delegations_stop_matching_but_are_kept() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, store) = engine_with_clock(clock);
        let delegation = delegation_for(&engine, now);

        assert!(engine.revoke(delegation.id).unwrap());
        assert!(engine
            .find_covering("5", Capability::ApproveQuotation, Some("12"))
            .unwrap()
            .is_none());

        let kept = store.all().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status, DelegationStatus::Revoked);
    }

    #[test]
    fn sweep_marks_expired_without_affecting_matching() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, store) = engine_with_clock(clock.clone());
        delegation_for(&engine, now);

        clock.set(now + Duration::hours(3));
        assert_eq!(engine.sweep_expired().unwrap(), 1);
        assert_eq!(store.all().unwrap()[0].status, DelegationStatus::Expired);
        assert_eq!(engine.sweep_expired().unwrap(), 0);
    }

    #[test]
    fn inverted_windows_are_rejected() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::at(now));
        let (engine, _store) = engine_with_clock(clock);
        let result = engine.create(NewDelegation {
            grantor_id: "2".into(),
            grantee_id: "5".into(),
            role_label: None,
            scope: DelegationScope::any(),
            permissions: BTreeSet::from([Capability::SendMessage]),
            valid_from: now,
            valid_until: now - Duration::minutes(1),
            reason: "bad window".into(),
        });
        assert!(matches!(result, Err(AccessError::InvertedWindow)));
    }
}
