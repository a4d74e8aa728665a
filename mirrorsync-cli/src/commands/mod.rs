pub mod once;
pub mod run;
pub mod status;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mirrorsync_core::{config, Settings};
use mirrorsync_daemon::RunOptions;

/// `--config` shared by every subcommand.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Settings file with `fork_url`, `mirrors_dir` and `sleep_time`.
    #[arg(long, short = 'c', default_value = config::DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,
}

impl SettingsArgs {
    pub fn load(&self) -> Result<Settings> {
        config::load_at(&self.config)
            .with_context(|| format!("failed to load settings from {}", self.config.display()))
    }
}

pub fn run_options(dry_run: bool) -> Result<RunOptions> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    Ok(RunOptions { dry_run, cwd })
}
