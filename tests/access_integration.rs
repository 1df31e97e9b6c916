//! ---
//! hearth_section: "15-testing-qa-runbook"
//! hearth_subsection: "integration-tests"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Integration and validation tests for the Hearth access core."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hearth_access::{
    AccessEngine, AccessMetrics, AccessVia, Actor, Capability, DelegationEngine,
    DelegationScope, EmergencyAccessController, EntityKind, IdentityResolver,
    MemoryDelegationStore, MemoryEmergencyStore, MemoryPolicyStore, MemoryResourceDirectory,
    MemoryUserStore, NewDelegation, PolicyEffect, RegionalPolicy, RegionalPolicyEngine,
    RegionalPolicyStore, ResourceContext, Role, TokenSigner, UserRecord,
};
use hearth_audit::{AuditLog, AuditWriter};
use hearth_common::{Clock, FixedClock, RegionCode, RequestMeta};
use hearth_config::{AccessConfig, TokenConfig};

struct World {
    engine: AccessEngine,
    signer: TokenSigner,
    users: Arc<MemoryUserStore>,
    delegations: DelegationEngine,
    emergency: EmergencyAccessController,
    directory: Arc<MemoryResourceDirectory>,
    policies: Arc<MemoryPolicyStore>,
    clock: Arc<FixedClock>,
    audit_path: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

fn world() -> World {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit.log");
    let clock = Arc::new(FixedClock::at(Utc::now()));
    let users = Arc::new(MemoryUserStore::default());
    let delegation_store = Arc::new(MemoryDelegationStore::default());
    let emergency_store = Arc::new(MemoryEmergencyStore::default());
    let policies = Arc::new(MemoryPolicyStore::default());
    let directory = Arc::new(MemoryResourceDirectory::default());

    let config = AccessConfig::default();
    let token_config = TokenConfig {
        secret: "integration-secret".into(),
        ttl_minutes: 60,
    };
    let signer = TokenSigner::new(&token_config, clock.clone());
    let resolver = IdentityResolver::new(&token_config, users.clone(), clock.clone());
    let delegations = DelegationEngine::new(delegation_store.clone(), clock.clone());
    let emergency = EmergencyAccessController::new(
        emergency_store.clone(),
        clock.clone(),
        config.emergency.window_minutes,
    );
    let region = RegionalPolicyEngine::new(
        policies.clone(),
        directory.clone(),
        config.baseline_region.clone(),
    );

    let log = AuditLog::open(&audit_path).unwrap();
    let (sink, _writer) = AuditWriter::spawn(log, clock.clone());

    let engine = AccessEngine::new(
        resolver,
        DelegationEngine::new(delegation_store, clock.clone()),
        EmergencyAccessController::new(
            emergency_store,
            clock.clone(),
            config.emergency.window_minutes,
        ),
        region,
        sink,
        config.audit.fail_policy,
    );

    World {
        engine,
        signer,
        users,
        delegations,
        emergency,
        directory,
        policies,
        clock,
        audit_path,
        _dir: dir,
    }
}

fn register(users: &MemoryUserStore, record: UserRecord) -> Actor {
    users.upsert(record.clone());
    Actor::from_record(&record)
}

#[tokio::test]
async fn end_to_end_delegated_approval_flow() {
    let world = world();
    let _grantor = register(
        &world.users,
        UserRecord::new("2", Role::PropertyManager, RegionCode::new("US")),
    );
    register(
        &world.users,
        UserRecord::new("5", Role::PropertyOwner, RegionCode::new("US")),
    );

    // Resolve the grantee from a signed token.
    let token = world.signer.issue("5", Role::PropertyOwner).unwrap();
    let grantee = world.engine.resolve_actor(&token).unwrap();
    assert_eq!(grantee.id, "5");

    // Grantor 2 delegates approve_quotation on property 12 for the next hour.
    let now = world.clock.now();
    world
        .delegations
        .create(NewDelegation {
            grantor_id: "2".into(),
            grantee_id: "5".into(),
            role_label: Some("approver".into()),
            scope: DelegationScope::properties(["12"]),
            permissions: BTreeSet::from([Capability::ApproveQuotation]),
            valid_from: now,
            valid_until: now + Duration::hours(1),
            reason: "manager on leave".into(),
        })
        .unwrap();

    let meta = RequestMeta::default().with_source("api");
    let on_12 = world
        .engine
        .authorize(
            &grantee,
            Capability::ApproveQuotation,
            &ResourceContext::new("property", "12"),
            &meta,
        )
        .await
        .unwrap();
    assert!(on_12.allowed);
    assert!(matches!(on_12.via, Some(AccessVia::Delegation(_))));

    let on_13 = world
        .engine
        .authorize(
            &grantee,
            Capability::ApproveQuotation,
            &ResourceContext::new("property", "13"),
            &meta,
        )
        .await
        .unwrap();
    assert!(!on_13.allowed);

    // After the window passes the same delegation authorizes nothing.
    world.clock.set(now + Duration::hours(2));
    let expired = world
        .engine
        .authorize(
            &grantee,
            Capability::ApproveQuotation,
            &ResourceContext::new("property", "12"),
            &meta,
        )
        .await
        .unwrap();
    assert!(!expired.allowed);
}

#[tokio::test]
async fn break_glass_overrides_region_and_capability_and_is_attributed() {
    let world = world();
    let responder = register(
        &world.users,
        UserRecord::new("9", Role::Vendor, RegionCode::new("US")),
    );
    world
        .directory
        .set_region("property", "44", RegionCode::new("EU"));

    let meta = RequestMeta::default().with_ip("10.0.0.9").with_session("sess-inc");

    // Without a grant: capability denied, region blocked.
    let before = world
        .engine
        .authorize(
            &responder,
            Capability::ManageProperty,
            &ResourceContext::new("property", "44"),
            &meta,
        )
        .await
        .unwrap();
    assert!(!before.allowed);
    let region_before = world
        .engine
        .check_region(&responder, "property", Some("44"), "property.update", &meta)
        .await
        .unwrap();
    assert!(!region_before.allowed());

    // Approved break-glass flips both outcomes.
    let grant = world
        .emergency
        .request("9", "INC-501", "flooded unit, owner unreachable")
        .unwrap();
    world.emergency.approve(grant.id, "admin-1").unwrap();

    let during = world
        .engine
        .authorize(
            &responder,
            Capability::ManageProperty,
            &ResourceContext::new("property", "44"),
            &meta,
        )
        .await
        .unwrap();
    assert_eq!(during.via, Some(AccessVia::Emergency(grant.id)));
    let region_during = world
        .engine
        .check_region(&responder, "property", Some("44"), "property.update", &meta)
        .await
        .unwrap();
    assert!(region_during.allowed());

    // The audit trail carries the grant id on every covered action.
    let tagged = hearth_audit::log::AuditLogReader::open(&world.audit_path)
        .unwrap()
        .map(|record| record.unwrap())
        .filter(|record| record.details["emergency_grant_id"] == grant.id.to_string())
        .count();
    assert!(tagged >= 2);

    // Expiry ends the override with no writeback.
    let now = world.clock.now();
    world.clock.set(now + Duration::minutes(121));
    let after = world
        .engine
        .authorize(
            &responder,
            Capability::ManageProperty,
            &ResourceContext::new("property", "44"),
            &meta,
        )
        .await
        .unwrap();
    assert!(!after.allowed);
}

#[tokio::test]
async fn regional_policy_overlay_and_super_admin_exemption() {
    let world = world();
    let admin = register(
        &world.users,
        UserRecord::new("1", Role::SuperAdmin, RegionCode::new("US")),
    );
    let manager = register(
        &world.users,
        UserRecord::new("3", Role::PropertyManager, RegionCode::new("EU")),
    );
    world
        .directory
        .set_region("property", "44", RegionCode::new("EU"));
    world.policies.upsert(RegionalPolicy::new(
        RegionCode::new("EU"),
        "property",
        "tenant.export",
        PolicyEffect::Deny,
        "tenant data must not leave the EU",
    ));

    let meta = RequestMeta::default();

    // Same-region actor still hits the deny policy.
    let denied = world
        .engine
        .check_region(&manager, "property", Some("44"), "tenant.export", &meta)
        .await
        .unwrap();
    assert_eq!(denied.reason(), Some("tenant data must not leave the EU"));

    // Cross-region super-admin passes layer one but not a deny overlay.
    let admin_decision = world
        .engine
        .check_region(&admin, "property", Some("44"), "tenant.export", &meta)
        .await
        .unwrap();
    assert!(!admin_decision.allowed());

    // For an unrestricted action the super-admin crosses regions freely.
    let admin_update = world
        .engine
        .check_region(&admin, "property", Some("44"), "property.update", &meta)
        .await
        .unwrap();
    assert!(admin_update.allowed());
}

#[tokio::test]
async fn lifecycle_validation_rejects_illegal_moves() {
    let world = world();
    let manager = register(
        &world.users,
        UserRecord::new("3", Role::PropertyManager, RegionCode::new("US")),
    );
    let meta = RequestMeta::default();

    assert!(world
        .engine
        .validate_transition(EntityKind::Ticket, "OPEN", "VENDOR_ASSIGNED", &manager, &meta)
        .await
        .is_ok());
    assert!(world
        .engine
        .validate_transition(EntityKind::Ticket, "OPEN", "OPEN", &manager, &meta)
        .await
        .is_ok());
    assert!(world
        .engine
        .validate_transition(EntityKind::Ticket, "OPEN", "COMPLETED", &manager, &meta)
        .await
        .is_err());
    assert!(world
        .engine
        .validate_transition(EntityKind::Property, "LISTED", "occupied", &manager, &meta)
        .await
        .is_ok());
}

#[tokio::test]
async fn metrics_track_denials_and_bypasses() {
    let registry = Arc::new(prometheus::Registry::new());
    let metrics = AccessMetrics::new(registry.clone()).unwrap();
    let World { engine, users, _dir, .. } = world();
    let engine = engine.with_metrics(metrics);
    let tenant = register(
        &users,
        UserRecord::new("7", Role::Tenant, RegionCode::new("US")),
    );

    let meta = RequestMeta::default();
    let denied = engine
        .authorize(
            &tenant,
            Capability::RecordPayment,
            &ResourceContext::new("property", "12"),
            &meta,
        )
        .await
        .unwrap();
    assert!(!denied.allowed);

    let denials = registry
        .gather()
        .into_iter()
        .find(|family| family.get_name() == "authz_denials_total")
        .expect("denial counter registered");
    assert_eq!(denials.get_metric()[0].get_counter().get_value() as u64, 1);
}
