//! Apply a [`Plan`] to the mirror registry.
//!
//! Order within a pass:
//!
//! 1. parse every added mirror file in full; check only `Name` in changed ones
//! 2. `remove` mirrors whose file is gone
//! 3. `add` new mirrors, each followed by `enable`/`disable`
//! 4. `edit` mirrors whose file changed
//!
//! Step 1 runs to completion before any command is issued, so a broken file
//! leaves the registry untouched for that pass. Every later failure aborts the
//! pass where it happens; commands already issued are not undone.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use mirrorsync_core::{mirror, MirrorName, MirrorRecord};

use crate::commands::RegistryCli;
use crate::error::SyncError;
use crate::exec::CommandRunner;
use crate::plan::{Baseline, Plan};
use crate::snapshot::{MirrorFile, Snapshot};
use crate::table::mirror_table;

/// Names acted upon by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed: Vec<MirrorName>,
    pub added: Vec<MirrorName>,
    pub updated: Vec<MirrorName>,
    pub unchanged: Vec<MirrorName>,
}

/// Per-action totals, as recorded in the state file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCounts {
    pub removed: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileReport {
    pub fn counts(&self) -> PassCounts {
        PassCounts {
            removed: self.removed.len(),
            added: self.added.len(),
            updated: self.updated.len(),
            unchanged: self.unchanged.len(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.updated.is_empty()
    }
}

/// Issue the registry commands `plan` calls for.
///
/// `current` must be the snapshot `plan` was computed from; `baseline` is only
/// consulted for the debug-level diff of updated files.
pub fn apply<R: CommandRunner + ?Sized>(
    runner: &mut R,
    registry: &RegistryCli,
    baseline: &Baseline,
    plan: &Plan,
    current: &Snapshot,
) -> Result<ReconcileReport, SyncError> {
    let additions = parse_additions(&plan.add, current)?;
    let updates = check_updates(&plan.update, current)?;

    let mut report = ReconcileReport {
        unchanged: plan.unchanged.clone(),
        ..ReconcileReport::default()
    };

    for name in &plan.remove {
        tracing::info!(mirror = %name, "remove mirror: {name}");
        runner.run(&registry.remove(name))?;
        report.removed.push(name.clone());
    }

    for record in &additions {
        runner.run(&registry.add(record))?;
        runner.run(&registry.toggle(record))?;
        tracing::info!(
            mirror = %record.name,
            "add a new mirror: {}, details are below:\n{}",
            record.name,
            mirror_table(record)
        );
        report.added.push(record.name.clone());
    }

    for (name, file) in updates {
        tracing::info!(mirror = %name, "update mirror: {name}");
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some(previous) = baseline.contents(&name) {
                tracing::debug!(
                    mirror = %name,
                    "changes:\n{}",
                    unified_diff(&name, previous, &file.contents)
                );
            }
        }
        runner.run(&registry.edit(&file.path, &name))?;
        report.updated.push(name);
    }

    Ok(report)
}

/// Fully parse the file of every mirror in `names`, failing on the first bad one.
fn parse_additions(names: &[MirrorName], current: &Snapshot) -> Result<Vec<MirrorRecord>, SyncError> {
    let mut records = Vec::with_capacity(names.len());
    for file in names.iter().filter_map(|name| current.get(name)) {
        let contents = mirror::decode(&file.path, &file.contents)?;
        records.push(mirror::parse_mirror(&file.path, contents)?);
    }
    Ok(records)
}

/// Check that every changed file still names its own mirror.
fn check_updates<'a>(
    names: &[MirrorName],
    current: &'a Snapshot,
) -> Result<Vec<(MirrorName, &'a MirrorFile)>, SyncError> {
    let mut checked = Vec::with_capacity(names.len());
    for file in names.iter().filter_map(|name| current.get(name)) {
        let contents = mirror::decode(&file.path, &file.contents)?;
        checked.push((mirror::check_name(&file.path, contents)?, file));
    }
    Ok(checked)
}

fn unified_diff(name: &MirrorName, before: &[u8], after: &[u8]) -> String {
    let file_name = name.file_name();
    let before = String::from_utf8_lossy(before);
    let after = String::from_utf8_lossy(after);
    TextDiff::from_lines(&*before, &*after)
        .unified_diff()
        .header(&format!("a/{file_name}"), &format!("b/{file_name}"))
        .context_radius(3)
        .to_string()
}
