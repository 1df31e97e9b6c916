//! ---
//! hearth_section: "07-audit-trail"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Append-only, hash-chained audit trail."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use chrono::{DateTime, SecondsFormat, Utc};
use hearth_common::RequestMeta;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sentinel `previous_hash` carried by the first record in a chain.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Severity assigned to an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine privileged action.
    #[default]
    Info,
    /// Denied request or policy violation.
    Warning,
    /// Break-glass usage and other incidents.
    Critical,
}

/// Input payload describing an auditable action, before chaining.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Acting user, or `None` for system-originated actions.
    pub actor_id: Option<String>,
    /// Action name (`property.update`, `authorize.denied`).
    pub action: String,
    /// Type of the touched resource (`property`, `ticket`).
    pub resource_type: String,
    /// Identifier of the touched resource, if any.
    pub resource_id: Option<String>,
    /// Structured details payload, opaque to this layer.
    pub details: serde_json::Value,
    /// Request-scoped caller metadata.
    pub meta: RequestMeta,
    /// Severity classification.
    pub severity: Severity,
}

impl AuditEvent {
    /// Build an event with default metadata and `Info` severity.
    pub fn new(
        actor_id: Option<String>,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id,
            details,
            meta: RequestMeta::default(),
            severity: Severity::default(),
        }
    }

    /// Attach request metadata.
    pub fn with_meta(mut self, meta: RequestMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Override the severity classification.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Record persisted in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    /// Monotonically increasing identifier assigned on append.
    pub id: u64,
    /// Timestamp captured when the record was hashed.
    pub timestamp: DateTime<Utc>,
    /// Acting user, or `None` for system actions.
    pub actor_id: Option<String>,
    /// Action name.
    pub action: String,
    /// Resource type.
    pub resource_type: String,
    /// Resource identifier, if any.
    pub resource_id: Option<String>,
    /// Structured details payload.
    pub details: serde_json::Value,
    /// Caller IP address.
    pub ip: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// Session identifier of the originating request.
    pub session_id: Option<String>,
    /// Severity classification.
    pub severity: Severity,
    /// Origin tag (`api`, `admin`, `system`).
    pub source: Option<String>,
    /// SHA-256 digest over this record's fields and `previous_hash`.
    pub hash: String,
    /// Digest of the preceding record, or [`GENESIS_HASH`].
    pub previous_hash: String,
}

impl AuditRecord {
    /// Compute the chained digest for a record's hashable fields.
    ///
    /// The digest input is, in order: the previous record's hash, the actor
    /// id (empty when absent), the action, the resource type, the resource
    /// id (empty when absent), the canonical JSON serialization of the
    /// details payload, and the RFC 3339 timestamp.
    pub fn compute_hash(
        previous_hash: &str,
        actor_id: Option<&str>,
        action: &str,
        resource_type: &str,
        resource_id: Option<&str>,
        details: &serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(previous_hash.as_bytes());
        hasher.update(actor_id.unwrap_or_default().as_bytes());
        hasher.update(action.as_bytes());
        hasher.update(resource_type.as_bytes());
        hasher.update(resource_id.unwrap_or_default().as_bytes());
        hasher.update(details.to_string().as_bytes());
        hasher.update(
            timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true)
                .as_bytes(),
        );
        hex::encode(hasher.finalize())
    }

    /// Recompute this record's digest from its stored fields.
    pub fn recompute_hash(&self) -> String {
        Self::compute_hash(
            &self.previous_hash,
            self.actor_id.as_deref(),
            &self.action,
            &self.resource_type,
            self.resource_id.as_deref(),
            &self.details,
            self.timestamp,
        )
    }

    /// Assemble a record from an event at a given chain position.
    pub fn chain(event: AuditEvent, id: u64, previous_hash: &str, timestamp: DateTime<Utc>) -> Self {
        let hash = Self::compute_hash(
            previous_hash,
            event.actor_id.as_deref(),
            &event.action,
            &event.resource_type,
            event.resource_id.as_deref(),
            &event.details,
            timestamp,
        );
        Self {
            id,
            timestamp,
            actor_id: event.actor_id,
            action: event.action,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            details: event.details,
            ip: event.meta.ip,
            user_agent: event.meta.user_agent,
            session_id: event.meta.session_id,
            severity: event.severity,
            source: event.meta.source,
            hash,
            previous_hash: previous_hash.to_owned(),
        }
    }
}
