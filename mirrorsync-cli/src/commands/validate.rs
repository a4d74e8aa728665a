//! `mirrorsync validate`: check mirror files before they reach the registry.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mirrorsync_core::{mirror, MirrorError};

use super::SettingsArgs;

/// Arguments for `mirrorsync validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory of mirror files. Defaults to the checkout's `mirrors_dir`.
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "problem")]
    problem: String,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let dir = match self.dir {
            Some(dir) => dir,
            None => {
                let settings = self.settings.load()?;
                let cwd = std::env::current_dir().context("could not determine working directory")?;
                settings.mirrors_path(&cwd)?
            }
        };

        let total = mirror::list_mirror_names(&dir)
            .with_context(|| format!("cannot list mirror files in {}", dir.display()))?
            .len();
        let failures = mirror::validate_dir(&dir)
            .with_context(|| format!("cannot validate {}", dir.display()))?;

        if failures.is_empty() {
            println!(
                "{} {total} mirror files valid in {}",
                "✓".green(),
                dir.display()
            );
            return Ok(());
        }

        print_failures(&dir, &failures);
        bail!("{} of {total} mirror files are invalid", failures.len());
    }
}

fn print_failures(dir: &Path, failures: &[(PathBuf, MirrorError)]) {
    println!(
        "{} {} invalid mirror files in {}",
        "✗".red(),
        failures.len(),
        dir.display()
    );
    let rows: Vec<FailureRow> = failures
        .iter()
        .map(|(path, err)| FailureRow {
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            problem: problem(err),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// Error text without the leading path, which the table already shows.
fn problem(err: &MirrorError) -> String {
    match err {
        MirrorError::MissingField { field, .. } => format!("missing required field `{field}`"),
        MirrorError::InvalidField { field, reason, .. } => format!("field `{field}` {reason}"),
        MirrorError::NameMismatch { name, .. } => {
            format!("filename does not match the name of the mirror (`{name}`)")
        }
        other => other.to_string(),
    }
}
