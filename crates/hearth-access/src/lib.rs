//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
//! Authorization core for the Hearth platform.
//!
//! A privileged request flows through an ordered pipeline: identity
//! resolution, break-glass check, delegation check, static capability
//! check, and regional policy. Lifecycle changes are validated against
//! fixed transition graphs, and every denial or break-glass usage is
//! recorded in the hash-chained audit trail.

#![warn(missing_docs)]

pub mod actor;
pub mod capability;
pub mod delegation;
pub mod emergency;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod pipeline;
pub mod region_policy;
pub mod store;
pub mod transition;

pub use actor::{Actor, ActorStatus, UserRecord};
pub use capability::{role_defaults, Capability, CapabilityEvaluator, Role};
pub use delegation::{
    Delegation, DelegationEngine, DelegationId, DelegationScope, DelegationStatus, NewDelegation,
};
pub use emergency::{
    EmergencyAccessController, EmergencyGrant, EmergencyGrantId, EmergencyGrantStatus,
};
pub use error::{AccessError, DenialLayer};
pub use identity::{IdentityResolver, TokenClaims, TokenSigner};
pub use metrics::AccessMetrics;
pub use pipeline::{AccessEngine, AccessVia, Decision, ResourceContext};
pub use region_policy::{PolicyEffect, RegionDecision, RegionalPolicy, RegionalPolicyEngine};
pub use store::{
    DelegationStore, EmergencyGrantStore, MemoryDelegationStore, MemoryEmergencyStore,
    MemoryPolicyStore, MemoryResourceDirectory, MemoryUserStore, RegionalPolicyStore,
    ResourceDirectory, UserStore,
};
pub use transition::{validate_transition, EntityKind, PropertyState, TicketState};
