//! `mirrorsync status`: the last recorded reconciliation pass.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mirrorsync_sync::{state, SyncState};

use super::SettingsArgs;

/// Arguments for `mirrorsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    state_file: PathBuf,
    last_pass: Option<SyncState>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "key")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let root = settings.state_root()?;
        let last_pass = state::load_at(&root)
            .with_context(|| format!("failed to read state under {}", root.display()))?;

        if self.json {
            let payload = StatusJson {
                state_file: state::state_path_at(&root),
                last_pass,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        match last_pass {
            Some(last) => print_table(&last),
            None => println!(
                "{} no reconciliation pass recorded under {}",
                "■".bright_black(),
                root.display()
            ),
        }
        Ok(())
    }
}

fn print_table(last: &SyncState) {
    let headline = if last.counts.removed + last.counts.added + last.counts.updated == 0 {
        "■".green().bold().to_string()
    } else {
        "■".yellow().bold().to_string()
    };
    println!(
        "{headline} mirrorsync v{} | {} pass {} ago",
        env!("CARGO_PKG_VERSION"),
        last.pass,
        format_age(last.synced_at)
    );

    let rows = vec![
        StatusTableRow {
            key: "synced at",
            value: last.synced_at.to_rfc3339(),
        },
        StatusTableRow {
            key: "checkout",
            value: last.checkout.display().to_string(),
        },
        StatusTableRow {
            key: "mirrors",
            value: last.mirrors.len().to_string(),
        },
        StatusTableRow {
            key: "removed",
            value: last.counts.removed.to_string(),
        },
        StatusTableRow {
            key: "added",
            value: last.counts.added.to_string(),
        },
        StatusTableRow {
            key: "updated",
            value: last.counts.updated.to_string(),
        },
        StatusTableRow {
            key: "unchanged",
            value: last.counts.unchanged.to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
