//! Shared reconciliation entrypoint used by the CLI and the daemon.
//!
//! A [`Pipeline`] owns the command runner and every resolved path. The
//! caller drives it: [`Pipeline::bootstrap`] once, [`Pipeline::initial_pass`]
//! once, then [`Pipeline::refresh_pass`] on whatever schedule it likes.

use std::path::{Path, PathBuf};

use chrono::Utc;

use mirrorsync_core::Settings;

use crate::commands::{parse_listing, GitCli, RegistryCli};
use crate::error::{io_err, SyncError};
use crate::exec::CommandRunner;
use crate::plan::{plan, Baseline};
use crate::reconcile::{apply, ReconcileReport};
use crate::snapshot::Snapshot;
use crate::state::{self, PassKind, SyncState};

pub struct Pipeline<R> {
    runner: R,
    registry: RegistryCli,
    git: GitCli,
    fork_url: String,
    checkout: PathBuf,
    mirrors: PathBuf,
    /// `None` disables state persistence (dry runs).
    state_root: Option<PathBuf>,
}

impl<R: CommandRunner> Pipeline<R> {
    /// Resolve paths from `settings`; `cwd` stands in for an unset `workdir`.
    pub fn new(
        runner: R,
        settings: &Settings,
        cwd: &Path,
        state_root: Option<PathBuf>,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            runner,
            registry: RegistryCli::new(&settings.registry_bin),
            git: GitCli::new(&settings.git_bin, settings.git_sync_args.clone()),
            fork_url: settings.fork_url.clone(),
            checkout: settings.checkout_dir(cwd)?,
            mirrors: settings.mirrors_path(cwd)?,
            state_root,
        })
    }

    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    pub fn mirrors_dir(&self) -> &Path {
        &self.mirrors
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Replace any existing checkout with a fresh clone of `fork_url`.
    pub fn bootstrap(&mut self) -> Result<(), SyncError> {
        if self.checkout.exists() {
            tracing::info!(path = %self.checkout.display(), "removing previous checkout");
            std::fs::remove_dir_all(&self.checkout).map_err(|e| io_err(&self.checkout, e))?;
        }
        if let Some(parent) = self.checkout.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        tracing::info!(url = %self.fork_url, path = %self.checkout.display(), "cloning");
        self.runner
            .run(&self.git.clone_repo(&self.fork_url, &self.checkout))?;
        self.ensure_checkout()
    }

    /// Reconcile the registry's own listing against the checkout.
    pub fn initial_pass(&mut self) -> Result<ReconcileReport, SyncError> {
        self.ensure_checkout()?;

        let listing = self.runner.run(&self.registry.list())?;
        let baseline = Baseline::Registry(parse_listing(&listing.stdout));
        tracing::info!(known = baseline.names().len(), "registry listing");

        let current = Snapshot::capture(&self.mirrors)?;
        self.reconcile(PassKind::Initial, &baseline, &current)
    }

    /// Snapshot, bring the checkout up to date, snapshot again, reconcile.
    ///
    /// The mirrors directory must exist on both sides of the sync.
    pub fn refresh_pass(&mut self) -> Result<ReconcileReport, SyncError> {
        let before = Snapshot::capture(&self.mirrors)?;
        tracing::info!(mirrors = before.len(), "before sync");

        self.runner.run(&self.git.sync(&self.checkout))?;
        tracing::info!("git sync");

        let after = Snapshot::capture(&self.mirrors)?;
        tracing::info!(mirrors = after.len(), "after sync");

        self.reconcile(PassKind::Refresh, &Baseline::Snapshot(before), &after)
    }

    fn reconcile(
        &mut self,
        kind: PassKind,
        baseline: &Baseline,
        current: &Snapshot,
    ) -> Result<ReconcileReport, SyncError> {
        let planned = plan(baseline, current);
        let report = apply(&mut self.runner, &self.registry, baseline, &planned, current)?;

        let counts = report.counts();
        tracing::info!(
            pass = %kind,
            removed = counts.removed,
            added = counts.added,
            updated = counts.updated,
            unchanged = counts.unchanged,
            "reconciliation pass complete"
        );

        if let Some(root) = &self.state_root {
            state::save_at(
                root,
                &SyncState {
                    synced_at: Utc::now(),
                    pass: kind,
                    checkout: self.checkout.clone(),
                    mirrors: current.digests(),
                    counts,
                },
            )?;
        }
        Ok(report)
    }

    fn ensure_checkout(&self) -> Result<(), SyncError> {
        if self.checkout.is_dir() {
            Ok(())
        } else {
            Err(SyncError::CheckoutMissing {
                path: self.checkout.clone(),
            })
        }
    }
}
