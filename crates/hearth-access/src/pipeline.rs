//! ---
//! hearth_section: "06-security-access-control"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Authorization pipeline, identity, and policy engines."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use hearth_audit::{AuditEvent, AuditReceipt, AuditSink, Severity};
use hearth_common::RequestMeta;
use hearth_config::FailPolicy;
use hearth_logging::{log_access_event, AccessEventOutcome, LogContext};
use serde_json::json;
use tracing::error;

use crate::actor::Actor;
use crate::capability::{Capability, CapabilityEvaluator};
use crate::delegation::{DelegationEngine, DelegationId};
use crate::emergency::{EmergencyAccessController, EmergencyGrantId};
use crate::error::{AccessError, DenialLayer};
use crate::identity::IdentityResolver;
use crate::metrics::AccessMetrics;
use crate::region_policy::{RegionDecision, RegionalPolicyEngine};
use crate::transition::{validate_transition, EntityKind};

/// Resource coordinates extracted from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContext {
    /// Type of the touched resource (`property`, `ticket`).
    pub resource_type: String,
    /// Identifier of the touched resource, if the request names one.
    pub resource_id: Option<String>,
}

impl ResourceContext {
    /// Context without a concrete resource id.
    pub fn of_type(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: None,
        }
    }

    /// Context naming a concrete resource.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: Some(resource_id.into()),
        }
    }
}

/// Authority under which a request was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessVia {
    /// Static role capability or per-user override.
    Capability,
    /// An active delegation, identified for audit attribution.
    Delegation(DelegationId),
    /// An active break-glass grant, identified for audit attribution.
    Emergency(EmergencyGrantId),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Authority that allowed it, when allowed.
    pub via: Option<AccessVia>,
    /// Layer that denied it, when denied.
    pub denied_by: Option<DenialLayer>,
    /// Human-readable reason.
    pub reason: String,
}

impl Decision {
    fn allowed_via(via: AccessVia, reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            via: Some(via),
            denied_by: None,
            reason: reason.into(),
        }
    }

    fn denied(layer: DenialLayer, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            via: None,
            denied_by: Some(layer),
            reason: reason.into(),
        }
    }

    /// Convert into a result, mapping denials to
    /// [`AccessError::AuthorizationDenied`] for handlers that abort on deny.
    pub fn into_result(self) -> Result<Decision, AccessError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(AccessError::AuthorizationDenied {
                layer: self.denied_by.unwrap_or(DenialLayer::Capability),
                reason: self.reason,
            })
        }
    }
}

/// Ordered authorization pipeline over the individual engines.
///
/// Per privileged request: break-glass first (an active grant bypasses
/// everything else), then delegations, then static capabilities; regional
/// policy is checked separately by handlers that touch regional resources.
/// Denials and break-glass usage are recorded in the audit trail.
pub struct AccessEngine {
    resolver: IdentityResolver,
    evaluator: CapabilityEvaluator,
    delegations: DelegationEngine,
    emergency: EmergencyAccessController,
    region: RegionalPolicyEngine,
    audit: AuditSink,
    fail_policy: FailPolicy,
    metrics: Option<AccessMetrics>,
}

impl AccessEngine {
    /// Assemble the pipeline from its engines.
    pub fn new(
        resolver: IdentityResolver,
        delegations: DelegationEngine,
        emergency: EmergencyAccessController,
        region: RegionalPolicyEngine,
        audit: AuditSink,
        fail_policy: FailPolicy,
    ) -> Self {
        Self {
            resolver,
            evaluator: CapabilityEvaluator::new(),
            delegations,
            emergency,
            region,
            audit,
            fail_policy,
            metrics: None,
        }
    }

    /// Attach Prometheus counters.
    pub fn with_metrics(mut self, metrics: AccessMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Resolve a bearer credential into the current actor.
    pub fn resolve_actor(&self, credential: &str) -> Result<Actor, AccessError> {
        if let Some(metrics) = &self.metrics {
            metrics.inc_auth_attempt();
        }
        let resolved = self.resolver.resolve(credential);
        if resolved.is_err() {
            if let Some(metrics) = &self.metrics {
                metrics.inc_auth_failure();
            }
        }
        resolved
    }

    /// Decide whether the actor may exercise a capability on a resource.
    pub async fn authorize(
        &self,
        actor: &Actor,
        capability: Capability,
        resource: &ResourceContext,
        meta: &RequestMeta,
    ) -> Result<Decision, AccessError> {
        if let Some(grant_id) = self.emergency.active_grant(&actor.id)? {
            if let Some(metrics) = &self.metrics {
                metrics.inc_emergency_bypass();
            }
            self.audit_best_effort(
                AuditEvent::new(
                    Some(actor.id.clone()),
                    "authorize.emergency_bypass",
                    resource.resource_type.clone(),
                    resource.resource_id.clone(),
                    json!({
                        "capability": capability.to_string(),
                        "emergency_grant_id": grant_id.to_string(),
                    }),
                )
                .with_meta(meta.clone())
                .with_severity(Severity::Critical),
            )
            .await;
            let ctx = LogContext::new()
                .with_actor(&actor.id)
                .with_resource(&resource.resource_type);
            log_access_event(
                Some(&ctx),
                "authorize.decision",
                "break-glass grant active; all other checks bypassed",
                AccessEventOutcome::Allowed,
            );
            return Ok(Decision::allowed_via(
                AccessVia::Emergency(grant_id),
                format!("break-glass grant {grant_id} active"),
            ));
        }

        if let Some(delegation_id) = self.delegations.find_covering(
            &actor.id,
            capability,
            resource.resource_id.as_deref(),
        )? {
            return Ok(Decision::allowed_via(
                AccessVia::Delegation(delegation_id),
                format!("covered by delegation {delegation_id}"),
            ));
        }

        if self.evaluator.allows(actor, capability) {
            return Ok(Decision::allowed_via(
                AccessVia::Capability,
                format!("role {} holds {capability}", actor.role),
            ));
        }

        if let Some(metrics) = &self.metrics {
            metrics.inc_authz_denial();
        }
        self.audit_best_effort(
            AuditEvent::new(
                Some(actor.id.clone()),
                "authorize.denied",
                resource.resource_type.clone(),
                resource.resource_id.clone(),
                json!({
                    "capability": capability.to_string(),
                    "layer": DenialLayer::Capability.to_string(),
                }),
            )
            .with_meta(meta.clone())
            .with_severity(Severity::Warning),
        )
        .await;
        let ctx = LogContext::new()
            .with_actor(&actor.id)
            .with_resource(&resource.resource_type);
        log_access_event(
            Some(&ctx),
            "authorize.decision",
            "no capability, delegation, or emergency coverage",
            AccessEventOutcome::Denied,
        );
        Ok(Decision::denied(
            DenialLayer::Capability,
            "no capability, delegation, or emergency coverage",
        ))
    }

    /// Apply regional policy to an action, honoring the break-glass bypass.
    pub async fn check_region(
        &self,
        actor: &Actor,
        resource_type: &str,
        resource_id: Option<&str>,
        action: &str,
        meta: &RequestMeta,
    ) -> Result<RegionDecision, AccessError> {
        if let Some(grant_id) = self.emergency.active_grant(&actor.id)? {
            if let Some(metrics) = &self.metrics {
                metrics.inc_emergency_bypass();
            }
            self.audit_best_effort(
                AuditEvent::new(
                    Some(actor.id.clone()),
                    "region.emergency_bypass",
                    resource_type.to_owned(),
                    resource_id.map(str::to_owned),
                    json!({
                        "action": action,
                        "emergency_grant_id": grant_id.to_string(),
                    }),
                )
                .with_meta(meta.clone())
                .with_severity(Severity::Critical),
            )
            .await;
            return Ok(RegionDecision::Allowed);
        }

        let decision = self.region.check(actor, resource_type, resource_id, action)?;
        if let RegionDecision::Denied { reason } = &decision {
            if let Some(metrics) = &self.metrics {
                metrics.inc_region_denial();
            }
            self.audit_best_effort(
                AuditEvent::new(
                    Some(actor.id.clone()),
                    "region.denied",
                    resource_type.to_owned(),
                    resource_id.map(str::to_owned),
                    json!({"action": action, "reason": reason}),
                )
                .with_meta(meta.clone())
                .with_severity(Severity::Warning),
            )
            .await;
        }
        Ok(decision)
    }

    /// Validate a lifecycle move, auditing rejections.
    pub async fn validate_transition(
        &self,
        entity: EntityKind,
        current: &str,
        target: &str,
        actor: &Actor,
        meta: &RequestMeta,
    ) -> Result<(), AccessError> {
        let result = validate_transition(entity, current, target);
        if result.is_err() {
            self.audit_best_effort(
                AuditEvent::new(
                    Some(actor.id.clone()),
                    "transition.denied",
                    entity.to_string(),
                    None,
                    json!({"from": current, "to": target}),
                )
                .with_meta(meta.clone())
                .with_severity(Severity::Warning),
            )
            .await;
        }
        result
    }

    /// Record a business-level audit event under the configured fail policy.
    ///
    /// Fail-open returns `Ok(None)` on append failure so the business
    /// operation proceeds and the gap is left for reconciliation;
    /// fail-closed surfaces the failure so the caller can roll back.
    pub async fn record_audit(
        &self,
        event: AuditEvent,
    ) -> Result<Option<AuditReceipt>, AccessError> {
        match self.audit.record(event).await {
            Ok(receipt) => Ok(Some(receipt)),
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics.inc_audit_append_failure();
                }
                match self.fail_policy {
                    FailPolicy::FailOpen => {
                        error!(error = %err, "audit append failed; continuing fail-open");
                        Ok(None)
                    }
                    FailPolicy::FailClosed => Err(AccessError::AuditWriteFailure(err)),
                }
            }
        }
    }

    /// Record a pipeline-internal audit event, surfacing failures only to
    /// the operational log. Denial logging must never recurse into another
    /// denial.
    async fn audit_best_effort(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(event).await {
            if let Some(metrics) = &self.metrics {
                metrics.inc_audit_append_failure();
            }
            error!(error = %err, "audit append failed for pipeline event");
        }
    }
}
