//! Error types for mirrorsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use mirrorsync_core::{ConfigError, MirrorError};

/// All errors that can arise from a reconciliation pass.
///
/// Every variant is fatal to the pass; nothing is retried or rolled back.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A mirror file failed to load or validate.
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("settings error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file JSON serialization/deserialization error.
    #[error("state file JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The program could not be started at all (missing binary, bad cwd).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The checkout directory is absent after (or instead of) a clone.
    #[error("checkout {path} does not exist; check whether git clone failed")]
    CheckoutMissing { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
