//! `mirrorsync once`: clone and run the initial pass only.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mirrorsync_core::MirrorName;
use mirrorsync_sync::ReconcileReport;

use super::{run_options, SettingsArgs};

/// Arguments for `mirrorsync once`.
#[derive(Args, Debug)]
pub struct OnceArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Log registry changes without making them. Git still runs.
    #[arg(long)]
    pub dry_run: bool,
}

impl OnceArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let options = run_options(self.dry_run)?;
        let report = mirrorsync_daemon::run_once(&settings, &options)
            .context("initial reconciliation failed")?;
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &ReconcileReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let counts = report.counts();

    if report.is_noop() {
        println!(
            "{prefix}{} registry already matches ({} mirrors)",
            "✓".green(),
            counts.unchanged
        );
        return;
    }

    println!(
        "{prefix}{} initial pass complete ({} removed, {} added, {} updated)",
        "✓".green(),
        counts.removed,
        counts.added,
        counts.updated
    );
    print_names("-".red().to_string(), &report.removed);
    print_names("+".green().to_string(), &report.added);
    print_names("~".yellow().to_string(), &report.updated);
}

fn print_names(marker: String, names: &[MirrorName]) {
    for name in names {
        println!("  {marker}  {name}");
    }
}
