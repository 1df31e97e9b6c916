//! ---
//! hearth_section: "07-audit-trail"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Append-only, hash-chained audit trail."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
//! Tamper-evident audit trail for privileged actions.
//!
//! Every record carries a SHA-256 digest over its own fields and the
//! previous record's digest, forming a hash chain that makes retroactive
//! edits detectable by a linear scan. Appends are linearized through a
//! single-writer task (see [`writer`]); readers never mutate the chain.

#![warn(missing_docs)]

pub mod log;
pub mod record;
pub mod writer;

use thiserror::Error;

pub use log::{AuditLog, ChainReport};
pub use record::{AuditEvent, AuditRecord, Severity, GENESIS_HASH};
pub use writer::{AuditReceipt, AuditSink, AuditWriter};

/// Errors surfaced by the audit subsystem.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying file I/O failed.
    #[error("audit storage error: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be serialized or parsed.
    #[error("audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The single-writer task has shut down and can no longer accept appends.
    #[error("audit writer closed")]
    WriterClosed,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, AuditError>;
