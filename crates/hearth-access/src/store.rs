//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
//! Storage seams consumed by the authorization engines.
//!
//! Each trait models one of the persisted tables; the in-memory
//! implementations back tests and development deployments. Read paths
//! tolerate eventual visibility of administrative writes within the bound
//! of one request, so plain `RwLock`-guarded maps suffice here.

use std::collections::HashMap;
use std::sync::Arc;

use hearth_common::RegionCode;
use parking_lot::RwLock;

use crate::actor::UserRecord;
use crate::delegation::{Delegation, DelegationId, DelegationStatus};
use crate::emergency::{EmergencyGrant, EmergencyGrantId};
use crate::error::AccessError;
use crate::region_policy::RegionalPolicy;

/// Lookup of durable user records.
pub trait UserStore: Send + Sync {
    /// Fetch a user by id.
    fn user(&self, id: &str) -> Result<Option<UserRecord>, AccessError>;
}

/// Persistence for delegations. Rows are never deleted.
pub trait DelegationStore: Send + Sync {
    /// All delegations granted to a user, any status.
    fn delegations_for_grantee(&self, grantee_id: &str) -> Result<Vec<Delegation>, AccessError>;
    /// Persist a new delegation.
    fn insert(&self, delegation: Delegation) -> Result<(), AccessError>;
    /// Change a delegation's status. Returns false for unknown ids.
    fn update_status(
        &self,
        id: DelegationId,
        status: DelegationStatus,
    ) -> Result<bool, AccessError>;
    /// Every stored delegation, for sweeps and administration.
    fn all(&self) -> Result<Vec<Delegation>, AccessError>;
}

/// Persistence for break-glass grants. Rows are never deleted.
pub trait EmergencyGrantStore: Send + Sync {
    /// Fetch a grant by id.
    fn get(&self, id: EmergencyGrantId) -> Result<Option<EmergencyGrant>, AccessError>;
    /// All grants requested by a user, any status.
    fn grants_for_requester(&self, requester_id: &str)
        -> Result<Vec<EmergencyGrant>, AccessError>;
    /// Persist a new grant.
    fn insert(&self, grant: EmergencyGrant) -> Result<(), AccessError>;
    /// Replace a grant's stored state.
    fn update(&self, grant: EmergencyGrant) -> Result<bool, AccessError>;
    /// Every stored grant, for sweeps and administration.
    fn all(&self) -> Result<Vec<EmergencyGrant>, AccessError>;
}

/// Persistence for regional residency policies.
pub trait RegionalPolicyStore: Send + Sync {
    /// The single applicable active policy for a lookup key, if any.
    fn policy_for(
        &self,
        region: &RegionCode,
        resource_type: &str,
        action: &str,
    ) -> Result<Option<RegionalPolicy>, AccessError>;
    /// Insert or replace a policy.
    fn upsert(&self, policy: RegionalPolicy);
}

/// Resolves a resource's declared region.
pub trait ResourceDirectory: Send + Sync {
    /// The region a resource resides in, if known.
    fn resource_region(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Option<RegionCode>, AccessError>;
}

/// In-memory user store for development and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryUserStore {
    /// Create or replace a user record.
    pub fn upsert(&self, user: UserRecord) {
        self.users.write().insert(user.id.clone(), user);
    }
}

impl UserStore for MemoryUserStore {
    fn user(&self, id: &str) -> Result<Option<UserRecord>, AccessError> {
        Ok(self.users.read().get(id).cloned())
    }
}

/// In-memory delegation store for development and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryDelegationStore {
    delegations: Arc<RwLock<HashMap<DelegationId, Delegation>>>,
}

impl DelegationStore for MemoryDelegationStore {
    fn delegations_for_grantee(&self, grantee_id: &str) -> Result<Vec<Delegation>, AccessError> {
        Ok(self
            .delegations
            .read()
            .values()
            .filter(|delegation| delegation.grantee_id == grantee_id)
            .cloned()
            .collect())
    }

    fn insert(&self, delegation: Delegation) -> Result<(), AccessError> {
        self.delegations.write().insert(delegation.id, delegation);
        Ok(())
    }

    fn update_status(
        &self,
        id: DelegationId,
        status: DelegationStatus,
    ) -> Result<bool, AccessError> {
        let mut delegations = self.delegations.write();
        match delegations.get_mut(&id) {
            Some(delegation) => {
                delegation.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn all(&self) -> Result<Vec<Delegation>, AccessError> {
        Ok(self.delegations.read().values().cloned().collect())
    }
}

/// In-memory emergency grant store for development and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryEmergencyStore {
    grants: Arc<RwLock<HashMap<EmergencyGrantId, EmergencyGrant>>>,
}

impl EmergencyGrantStore for MemoryEmergencyStore {
    fn get(&self, id: EmergencyGrantId) -> Result<Option<EmergencyGrant>, AccessError> {
        Ok(self.grants.read().get(&id).cloned())
    }

    fn grants_for_requester(
        &self,
        requester_id: &str,
    ) -> Result<Vec<EmergencyGrant>, AccessError> {
        Ok(self
            .grants
            .read()
            .values()
            .filter(|grant| grant.requester_id == requester_id)
            .cloned()
            .collect())
    }

    fn insert(&self, grant: EmergencyGrant) -> Result<(), AccessError> {
        self.grants.write().insert(grant.id, grant);
        Ok(())
    }

    fn update(&self, grant: EmergencyGrant) -> Result<bool, AccessError> {
        Ok(self.grants.write().insert(grant.id, grant).is_some())
    }

    fn all(&self) -> Result<Vec<EmergencyGrant>, AccessError> {
        Ok(self.grants.read().values().cloned().collect())
    }
}

/// In-memory policy store for development and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryPolicyStore {
    policies: Arc<RwLock<Vec<RegionalPolicy>>>,
}

impl RegionalPolicyStore for MemoryPolicyStore {
    fn policy_for(
        &self,
        region: &RegionCode,
        resource_type: &str,
        action: &str,
    ) -> Result<Option<RegionalPolicy>, AccessError> {
        Ok(self
            .policies
            .read()
            .iter()
            .find(|policy| {
                policy.active
                    && policy.region == *region
                    && policy.resource_type == resource_type
                    && policy.action == action
            })
            .cloned())
    }

    fn upsert(&self, policy: RegionalPolicy) {
        let mut policies = self.policies.write();
        match policies.iter_mut().find(|existing| existing.id == policy.id) {
            Some(existing) => *existing = policy,
            None => policies.push(policy),
        }
    }
}

/// In-memory resource directory for development and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryResourceDirectory {
    regions: Arc<RwLock<HashMap<(String, String), RegionCode>>>,
}

impl MemoryResourceDirectory {
    /// Declare the region a resource resides in.
    pub fn set_region(&self, resource_type: &str, resource_id: &str, region: RegionCode) {
        self.regions
            .write()
            .insert((resource_type.to_owned(), resource_id.to_owned()), region);
    }
}

impl ResourceDirectory for MemoryResourceDirectory {
    fn resource_region(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Option<RegionCode>, AccessError> {
        Ok(self
            .regions
            .read()
            .get(&(resource_type.to_owned(), resource_id.to_owned()))
            .cloned())
    }
}
