//! mirrorsync: keep a mirror registry in step with a git repository of
//! mirror description files.
//!
//! # Usage
//!
//! ```text
//! mirrorsync run [--config refresh_mirrors.yaml] [--dry-run]
//! mirrorsync once [--config refresh_mirrors.yaml] [--dry-run]
//! mirrorsync validate [DIR] [--config refresh_mirrors.yaml]
//! mirrorsync status [--config refresh_mirrors.yaml] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{once::OnceArgs, run::RunArgs, status::StatusArgs, validate::ValidateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mirrorsync",
    version,
    about = "Reconcile a mirror registry with mirror files tracked in git",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone, reconcile against the registry, then refresh every `sleep_time` seconds.
    Run(RunArgs),

    /// Clone and reconcile against the registry once, then exit.
    Once(OnceArgs),

    /// Check every mirror file without touching the registry.
    Validate(ValidateArgs),

    /// Show the last recorded reconciliation pass.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Once(args) => args.run(),
        Commands::Validate(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
