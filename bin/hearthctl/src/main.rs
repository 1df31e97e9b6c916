//! ---
//! hearth_section: "05-networking-external-interfaces"
//! hearth_subsection: "binary"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Control CLI for administrators operating Hearth."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{Parser, Subcommand};
use hearth_logging as logging;

mod audit;
mod token;

#[derive(Debug, Parser)]
#[command(
    author,
    about = "Hearth administrative control utility",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Audit trail inspection and verification")]
    Audit(audit::AuditCommand),
    #[command(subcommand, about = "Development token management")]
    Token(token::TokenCommand),
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Audit(cmd) => audit::run(cmd)?,
        Commands::Token(cmd) => token::run(cmd)?,
    }
    Ok(())
}
