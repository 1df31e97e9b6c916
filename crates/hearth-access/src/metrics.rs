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

use prometheus::{IntCounter, Registry};

/// Authorization metrics exported via Prometheus.
#[derive(Clone)]
pub struct AccessMetrics {
    registry: Arc<Registry>,
    auth_attempts_total: IntCounter,
    auth_failures_total: IntCounter,
    authz_denials_total: IntCounter,
    emergency_bypass_total: IntCounter,
    region_denials_total: IntCounter,
    audit_append_failures_total: IntCounter,
}

impl AccessMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let auth_attempts_total =
            IntCounter::new("auth_attempts_total", "Total credential resolutions")?;
        let auth_failures_total =
            IntCounter::new("auth_failures_total", "Failed credential resolutions")?;
        let authz_denials_total = IntCounter::new(
            "authz_denials_total",
            "Requests denied by the authorization pipeline",
        )?;
        let emergency_bypass_total = IntCounter::new(
            "emergency_bypass_total",
            "Actions authorized under a break-glass grant",
        )?;
        let region_denials_total = IntCounter::new(
            "region_denials_total",
            "Requests blocked by regional policy",
        )?;
        let audit_append_failures_total = IntCounter::new(
            "audit_append_failures_total",
            "Audit appends that failed at the storage layer",
        )?;

        registry.register(Box::new(auth_attempts_total.clone()))?;
        registry.register(Box::new(auth_failures_total.clone()))?;
        registry.register(Box::new(authz_denials_total.clone()))?;
        registry.register(Box::new(emergency_bypass_total.clone()))?;
        registry.register(Box::new(region_denials_total.clone()))?;
        registry.register(Box::new(audit_append_failures_total.clone()))?;

        Ok(Self {
            registry,
            auth_attempts_total,
            auth_failures_total,
            authz_denials_total,
            emergency_bypass_total,
            region_denials_total,
            audit_append_failures_total,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Increment credential resolution attempts.
    pub fn inc_auth_attempt(&self) {
        self.auth_attempts_total.inc();
    }

    /// Increment credential resolution failures.
    pub fn inc_auth_failure(&self) {
        self.auth_failures_total.inc();
    }

    /// Increment pipeline denials.
    pub fn inc_authz_denial(&self) {
        self.authz_denials_total.inc();
    }

    /// Increment break-glass authorizations.
    pub fn inc_emergency_bypass(&self) {
        self.emergency_bypass_total.inc();
    }

    /// Increment regional blocks.
    pub fn inc_region_denial(&self) {
        self.region_denials_total.inc();
    }

    /// Increment audit append failures.
    pub fn inc_audit_append_failure(&self) {
        self.audit_append_failures_total.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increment() {
        let registry = Arc::new(Registry::new());
        let metrics = AccessMetrics::new(registry.clone()).unwrap();
        metrics.inc_auth_attempt();
        metrics.inc_auth_failure();
        metrics.inc_authz_denial();
        metrics.inc_emergency_bypass();
        metrics.inc_region_denial();
        metrics.inc_audit_append_failure();
        assert_eq!(registry.gather().len(), 6);
    }
}
