//! Development tasks for the rules engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Resolve, Validate};

/// Development tasks for the rules engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for rules content", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Resolve an inheritable attribute for a character
    Resolve(Resolve),

    /// Check a character against catalog prerequisites
    Check(Check),

    /// Validate catalog and roster content
    Validate(Validate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RULES_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Resolve(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
        Command::Validate(cmd) => cmd.execute(),
    }
}
