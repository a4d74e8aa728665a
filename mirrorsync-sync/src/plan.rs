//! Set difference between a baseline and the current mirrors directory.

use std::collections::BTreeSet;

use mirrorsync_core::MirrorName;

use crate::snapshot::Snapshot;

/// What the current directory is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// Names the registry already knows (initial pass). Contents are
    /// unknown, so every shared mirror is treated as changed.
    Registry(BTreeSet<MirrorName>),
    /// The directory as it was before `git` synchronization (refresh pass).
    Snapshot(Snapshot),
}

impl Baseline {
    pub fn names(&self) -> BTreeSet<MirrorName> {
        match self {
            Baseline::Registry(names) => names.clone(),
            Baseline::Snapshot(snapshot) => snapshot.names(),
        }
    }

    /// Previous contents of `name`, when the baseline has them.
    pub fn contents(&self, name: &MirrorName) -> Option<&[u8]> {
        match self {
            Baseline::Registry(_) => None,
            Baseline::Snapshot(snapshot) => snapshot.get(name).map(|f| f.contents.as_slice()),
        }
    }
}

/// Mirrors grouped by the action they need. Every list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub remove: Vec<MirrorName>,
    pub add: Vec<MirrorName>,
    pub update: Vec<MirrorName>,
    pub unchanged: Vec<MirrorName>,
}

/// Compare `baseline` with `current`.
///
/// - in baseline only → `remove`
/// - in current only → `add`
/// - in both with byte-identical contents → `unchanged`
/// - in both otherwise → `update`
pub fn plan(baseline: &Baseline, current: &Snapshot) -> Plan {
    let before = baseline.names();
    let after = current.names();

    let remove = before.difference(&after).cloned().collect();
    let add = after.difference(&before).cloned().collect();

    let mut update = Vec::new();
    let mut unchanged = Vec::new();
    for name in before.intersection(&after) {
        let now = current.get(name).map(|f| f.contents.as_slice());
        match baseline.contents(name) {
            Some(previous) if Some(previous) == now => unchanged.push(name.clone()),
            _ => update.push(name.clone()),
        }
    }

    Plan {
        remove,
        add,
        update,
        unchanged,
    }
}
