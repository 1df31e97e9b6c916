//! ---
//! hearth_section: "15-testing-qa-runbook"
//! hearth_subsection: "integration-tests"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Integration and validation tests for the Hearth access core."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use hearth_audit::log::{verify_file, AuditLogReader};
use hearth_audit::{AuditEvent, AuditLog, AuditWriter, GENESIS_HASH};
use hearth_common::{RequestMeta, SystemClock};
use serde_json::json;
use tempfile::tempdir;

fn event(actor: &str, action: &str, seq: usize) -> AuditEvent {
    AuditEvent::new(
        Some(actor.into()),
        action,
        "property",
        Some("12".into()),
        json!({"seq": seq}),
    )
    .with_meta(
        RequestMeta::default()
            .with_ip("192.0.2.10")
            .with_user_agent("hearth-tests/1.0")
            .with_session("sess-77")
            .with_source("api"),
    )
}

#[test]
fn recomputing_every_hash_reproduces_the_stored_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let mut log = AuditLog::open(&path).unwrap();
    for i in 0..20 {
        log.append(event("alice", "property.update", i), Utc::now())
            .unwrap();
    }
    drop(log);

    let mut previous = GENESIS_HASH.to_owned();
    let mut count = 0usize;
    for record in AuditLogReader::open(&path).unwrap() {
        let record = record.unwrap();
        assert_eq!(record.previous_hash, previous);
        assert_eq!(record.recompute_hash(), record.hash);
        previous = record.hash.clone();
        count += 1;
    }
    assert_eq!(count, 20);

    let report = verify_file(&path).unwrap();
    assert!(report.intact());
    assert_eq!(report.records, 20);
}

#[test]
fn mutating_any_earlier_record_breaks_the_chain_at_that_point() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let mut log = AuditLog::open(&path).unwrap();
    for i in 0..6 {
        log.append(event("alice", "payment.record", i), Utc::now())
            .unwrap();
    }
    drop(log);

    let raw = std::fs::read_to_string(&path).unwrap();
    let mut rows: Vec<serde_json::Value> = raw
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    // Tamper with record 3's actor attribution.
    rows[2]["actor_id"] = json!("mallory");
    let rewritten: String = rows.iter().map(|row| row.to_string() + "\n").collect();
    std::fs::write(&path, rewritten).unwrap();

    let report = verify_file(&path).unwrap();
    assert!(!report.intact());
    assert_eq!(report.first_break, Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_linearize_into_one_chain() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let log = AuditLog::open(&path).unwrap();
    let (sink, writer) = AuditWriter::spawn(log, Arc::new(SystemClock));

    const CONCURRENCY: usize = 16;
    let mut handles = Vec::new();
    for i in 0..CONCURRENCY {
        let sink = sink.clone();
        handles.push(tokio::spawn(async move {
            sink.record(event("writer", "concurrent.append", i))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    drop(sink);
    writer.join().await;

    let report = verify_file(&path).unwrap();
    assert!(report.intact());
    assert_eq!(report.records, CONCURRENCY);

    // No two records share a predecessor, and ids are gapless from 1.
    let records: Vec<_> = AuditLogReader::open(&path)
        .unwrap()
        .map(|record| record.unwrap())
        .collect();
    let predecessors: HashSet<&str> = records
        .iter()
        .map(|record| record.previous_hash.as_str())
        .collect();
    assert_eq!(predecessors.len(), CONCURRENCY);
    let ids: Vec<u64> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, (1..=CONCURRENCY as u64).collect::<Vec<_>>());
}

#[test]
fn request_metadata_round_trips_through_the_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let mut log = AuditLog::open(&path).unwrap();
    log.append(event("alice", "message.send", 0), Utc::now())
        .unwrap();
    drop(log);

    let record = AuditLogReader::open(&path)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(record.ip.as_deref(), Some("192.0.2.10"));
    assert_eq!(record.user_agent.as_deref(), Some("hearth-tests/1.0"));
    assert_eq!(record.session_id.as_deref(), Some("sess-77"));
    assert_eq!(record.source.as_deref(), Some("api"));
}
