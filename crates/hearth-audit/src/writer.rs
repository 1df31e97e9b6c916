//! ---
//! hearth_section: "07-audit-trail"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Append-only, hash-chained audit trail."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::sync::Arc;

use hearth_common::Clock;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

use crate::log::AuditLog;
use crate::record::AuditEvent;
use crate::{AuditError, Result};

const QUEUE_DEPTH: usize = 256;

/// Confirmation returned for a successfully appended record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReceipt {
    /// Identifier assigned to the record.
    pub id: u64,
    /// Digest of the appended record.
    pub hash: String,
}

struct AppendRequest {
    event: AuditEvent,
    reply: oneshot::Sender<Result<AuditReceipt>>,
}

/// Cloneable handle used by request paths to enqueue audit appends.
///
/// All appends funnel through one writer task that owns the log, so two
/// concurrent callers can never chain to the same predecessor. A request
/// accepted by the queue is written even if the caller's future is
/// dropped; only the receipt is lost.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AppendRequest>,
}

impl AuditSink {
    /// A sink whose writer has already exited.
    ///
    /// Every `record` call fails with [`AuditError::WriterClosed`]; used to
    /// exercise fail-open/fail-closed audit policies.
    pub fn closed() -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        Self { tx }
    }

    /// Enqueue an event and wait for its receipt.
    pub async fn record(&self, event: AuditEvent) -> Result<AuditReceipt> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AppendRequest { event, reply })
            .await
            .map_err(|_| AuditError::WriterClosed)?;
        rx.await.map_err(|_| AuditError::WriterClosed)?
    }
}

/// Owner of the single-writer task.
pub struct AuditWriter {
    join: tokio::task::JoinHandle<()>,
}

impl AuditWriter {
    /// Spawn the writer task over an opened log.
    ///
    /// The clock is sampled inside the task, at the same step as the hash
    /// computation.
    pub fn spawn(mut log: AuditLog, clock: Arc<dyn Clock>) -> (AuditSink, AuditWriter) {
        let (tx, mut rx) = mpsc::channel::<AppendRequest>(QUEUE_DEPTH);
        let join = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let result = log
                    .append(request.event, clock.now())
                    .map(|record| AuditReceipt {
                        id: record.id,
                        hash: record.hash,
                    });
                if let Err(err) = &result {
                    error!(error = %err, path = %log.path().display(), "audit append failed");
                }
                // The caller may have gone away; the append already happened.
                let _ = request.reply.send(result);
            }
        });
        (AuditSink { tx }, AuditWriter { join })
    }

    /// Wait for the writer to drain and exit.
    ///
    /// The task ends once every [`AuditSink`] clone has been dropped.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}
