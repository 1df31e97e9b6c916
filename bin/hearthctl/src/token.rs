//! ---
//! hearth_section: "05-networking-external-interfaces"
//! hearth_subsection: "binary"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Control CLI for administrators operating Hearth."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use hearth_access::{Role, TokenSigner};
use hearth_common::SystemClock;
use hearth_config::AccessConfig;

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Mint a signed bearer token for development use.
    Issue {
        /// Subject user id.
        #[arg(long)]
        subject: String,
        /// Role claim (`super-admin`, `property-manager`, ...).
        #[arg(long)]
        role: String,
        /// Override the configured token lifetime.
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}

pub fn run(command: TokenCommand) -> Result<()> {
    match command {
        TokenCommand::Issue {
            subject,
            role,
            ttl_minutes,
        } => {
            let role = Role::from_str(&role).map_err(|_| anyhow!("unknown role: {role}"))?;
            let mut config = AccessConfig::load(&["configs/access.toml", "access.toml"])
                .unwrap_or_default()
                .token;
            if let Some(ttl) = ttl_minutes {
                config.ttl_minutes = ttl;
            }
            let signer = TokenSigner::new(&config, Arc::new(SystemClock));
            println!("{}", signer.issue(&subject, role)?);
            Ok(())
        }
    }
}
