//! ---
//! hearth_section: "05-networking-external-interfaces"
//! hearth_subsection: "binary"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Control CLI for administrators operating Hearth."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Subcommand;
use hearth_audit::log::{tail, verify_file};

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Verify the hash chain of an audit log file.
    Verify {
        /// Path to the audit log.
        #[arg(long)]
        path: PathBuf,
    },
    /// Print the most recent audit records.
    Tail {
        /// Path to the audit log.
        #[arg(long)]
        path: PathBuf,
        /// Number of records to print.
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

pub fn run(command: AuditCommand) -> Result<()> {
    match command {
        AuditCommand::Verify { path } => {
            let report = verify_file(&path)?;
            if report.intact() {
                println!("chain intact: {} records", report.records);
                Ok(())
            } else {
                bail!(
                    "chain broken at record {} of {}",
                    report.first_break.unwrap_or_default(),
                    report.records
                );
            }
        }
        AuditCommand::Tail { path, count } => {
            for record in tail(&path, count)? {
                println!("{}", serde_json::to_string(&record)?);
            }
            Ok(())
        }
    }
}
