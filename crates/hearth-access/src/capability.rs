//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::actor::Actor;

/// Fixed set of platform roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Role {
    /// Platform operators; pass every capability check unconditionally.
    SuperAdmin,
    /// Staff managing portfolios of properties.
    PropertyManager,
    /// Owners of one or more properties.
    PropertyOwner,
    /// Contracted maintenance vendors.
    Vendor,
    /// Tenants occupying a property.
    Tenant,
}

/// Named permissions checked independently of role.
///
/// The set is closed: unknown capability names fail to parse, so free-form
/// permission strings are rejected at write time rather than trusted at
/// read time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Capability {
    /// Create, suspend, and edit user accounts.
    ManageUsers,
    /// Read property records.
    ViewProperty,
    /// Create and edit property records.
    ManageProperty,
    /// Publish a property listing.
    ListProperty,
    /// Create and edit tenancy agreements.
    ManageTenancy,
    /// Assign a vendor to a maintenance ticket.
    AssignVendor,
    /// Submit a quotation against a ticket.
    SubmitQuotation,
    /// Approve a submitted quotation.
    ApproveQuotation,
    /// Schedule maintenance work on a property.
    ScheduleMaintenance,
    /// Close a maintenance ticket.
    CloseTicket,
    /// Record an incoming payment.
    RecordPayment,
    /// Read payment history.
    ViewPayments,
    /// Send messages between parties.
    SendMessage,
    /// Read the audit trail.
    ViewAuditLog,
    /// Create and revoke delegations.
    ManageDelegations,
    /// Approve break-glass access requests.
    ApproveEmergencyAccess,
    /// Create and edit regional residency policies.
    ManageRegionalPolicies,
}

/// Static default capability set for a role.
pub fn role_defaults(role: Role) -> &'static [Capability] {
    use Capability::*;
    match role {
        // Super-admin short-circuits evaluation; the list is for display.
        Role::SuperAdmin => &[
            ManageUsers,
            ViewProperty,
            ManageProperty,
            ListProperty,
            ManageTenancy,
            AssignVendor,
            SubmitQuotation,
            ApproveQuotation,
            ScheduleMaintenance,
            CloseTicket,
            RecordPayment,
            ViewPayments,
            SendMessage,
            ViewAuditLog,
            ManageDelegations,
            ApproveEmergencyAccess,
            ManageRegionalPolicies,
        ],
        Role::PropertyManager => &[
            ViewProperty,
            ManageProperty,
            ListProperty,
            ManageTenancy,
            AssignVendor,
            ApproveQuotation,
            ScheduleMaintenance,
            CloseTicket,
            RecordPayment,
            ViewPayments,
            SendMessage,
            ManageDelegations,
        ],
        Role::PropertyOwner => &[
            ViewProperty,
            ListProperty,
            ApproveQuotation,
            ViewPayments,
            SendMessage,
        ],
        Role::Vendor => &[ViewProperty, SubmitQuotation, ScheduleMaintenance, SendMessage],
        Role::Tenant => &[ViewProperty, SendMessage],
    }
}

/// Stateless evaluator over an actor's static permissions.
///
/// Safe to call many times per request: no I/O, no side effects, only the
/// already-loaded [`Actor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityEvaluator;

impl CapabilityEvaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Whether the actor holds the capability statically.
    ///
    /// Super-admins always pass. Otherwise the capability must appear in
    /// the role's default set, or be granted `true` in the actor's
    /// per-user override map. An override of `false` does not mask a role
    /// default.
    pub fn allows(&self, actor: &Actor, capability: Capability) -> bool {
        if actor.role == Role::SuperAdmin {
            return true;
        }
        if role_defaults(actor.role).contains(&capability) {
            return true;
        }
        actor.capability_overrides.get(&capability).copied() == Some(true)
    }
}
