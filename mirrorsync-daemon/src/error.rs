use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the polling runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings error: {0}")]
    Config(#[from] mirrorsync_core::ConfigError),

    #[error("sync error: {0}")]
    Sync(#[from] mirrorsync_sync::SyncError),

    #[error("reconciliation task join failure: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
