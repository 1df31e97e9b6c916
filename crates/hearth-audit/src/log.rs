//! ---
//! hearth_section: "07-audit-trail"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Append-only, hash-chained audit trail."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::record::{AuditEvent, AuditRecord, GENESIS_HASH};
use crate::{AuditError, Result};

/// Outcome of a full-chain verification scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of records scanned.
    pub records: usize,
    /// Identifier of the first record whose digest or back-link failed, if any.
    pub first_break: Option<u64>,
}

impl ChainReport {
    /// Whether every record's digest and back-link checked out.
    pub fn intact(&self) -> bool {
        self.first_break.is_none()
    }
}

/// Audit log backed by a newline-delimited JSON file.
///
/// The log is append-only: rows are never rewritten, and the open path
/// scans existing records to recover the chain tail. Callers must
/// serialize appends (see [`crate::writer`]); the log itself assumes a
/// single owner.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    writer: BufWriter<File>,
    last_hash: String,
    next_id: u64,
}

impl AuditLog {
    /// Open an audit log, recovering the tail hash and id from existing rows.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut last_hash = GENESIS_HASH.to_owned();
        let mut next_id = 1u64;
        if path.exists() {
            for line in BufReader::new(File::open(&path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: AuditRecord = serde_json::from_str(&line)?;
                last_hash = record.hash.clone();
                next_id = record.id + 1;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            last_hash,
            next_id,
        })
    }

    /// Append a new record chained to the current tail.
    ///
    /// The timestamp is supplied by the caller so that it is captured at
    /// the same step as the hash computation.
    pub fn append(&mut self, event: AuditEvent, timestamp: DateTime<Utc>) -> Result<AuditRecord> {
        let record = AuditRecord::chain(event, self.next_id, &self.last_hash, timestamp);
        let line = serde_json::to_string(&record)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.last_hash = record.hash.clone();
        self.next_id += 1;
        Ok(record)
    }

    /// Digest of the most recently appended record.
    pub fn tail_hash(&self) -> &str {
        &self.last_hash
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the chain from the beginning of the file.
    pub fn verify(&self) -> Result<ChainReport> {
        verify_file(&self.path)
    }
}

/// Verify a chain on disk without holding an open log.
///
/// Walks every record in insertion order, checking both the stored
/// back-link and the recomputed digest. Detection is a pure read; the
/// file is never modified.
pub fn verify_file(path: impl AsRef<Path>) -> Result<ChainReport> {
    let path = path.as_ref();
    let mut report = ChainReport {
        records: 0,
        first_break: None,
    };
    if !path.exists() {
        return Ok(report);
    }

    let mut previous = GENESIS_HASH.to_owned();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: AuditRecord = serde_json::from_str(&line)?;
        report.records += 1;
        let linked = record.previous_hash == previous;
        let digest_ok = record.recompute_hash() == record.hash;
        if !(linked && digest_ok) && report.first_break.is_none() {
            report.first_break = Some(record.id);
        }
        previous = record.hash;
    }
    Ok(report)
}

/// Streaming reader over the records of an audit log file.
pub struct AuditLogReader {
    lines: std::io::Lines<BufReader<File>>,
}

impl AuditLogReader {
    /// Open the log for sequential reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl Iterator for AuditLogReader {
    type Item = Result<AuditRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    return Some(serde_json::from_str(&line).map_err(AuditError::from))
                }
                Err(err) => return Some(Err(err.into())),
            }
        }
    }
}

/// Collect the last `n` records of a log file.
pub fn tail(path: impl AsRef<Path>, n: usize) -> Result<Vec<AuditRecord>> {
    let mut records = Vec::new();
    for record in AuditLogReader::open(path)? {
        records.push(record?);
    }
    let skip = records.len().saturating_sub(n);
    Ok(records.split_off(skip))
}
