//! `mirrorsync run`: the long-running reconciliation loop.

use anyhow::{Context, Result};
use clap::Args;

use super::{run_options, SettingsArgs};

/// Arguments for `mirrorsync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Log registry changes without making them. Git still runs.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let options = run_options(self.dry_run)?;
        mirrorsync_daemon::start_blocking(settings, options)
            .context("mirror reconciliation stopped")
    }
}
