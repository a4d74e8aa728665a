//! Record of the last successful reconciliation pass.
//!
//! Persists a `SyncState` JSON document at `<state_root>/state.json`.
//! Writes go to a `.tmp` sibling first and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};
use crate::reconcile::PassCounts;

pub const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Baseline was the registry listing.
    Initial,
    /// Baseline was the pre-sync snapshot.
    Refresh,
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassKind::Initial => f.write_str("initial"),
            PassKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// On-disk state payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub synced_at: DateTime<Utc>,
    pub pass: PassKind,
    pub checkout: PathBuf,
    /// Mirror name → SHA-256 of its file after the pass.
    pub mirrors: BTreeMap<String, String>,
    pub counts: PassCounts,
}

/// `<root>/state.json`
pub fn state_path_at(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

/// Load the last recorded pass, or `None` if nothing was recorded yet.
pub fn load_at(root: &Path) -> Result<Option<SyncState>, SyncError> {
    let path = state_path_at(root);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save `state` atomically, creating `root` if needed.
pub fn save_at(root: &Path, state: &SyncState) -> Result<(), SyncError> {
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let path = state_path_at(root);
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
