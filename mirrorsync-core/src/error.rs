//! Error types for mirrorsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MirrorName;

/// Errors raised while loading the startup settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file did not exist at the expected path.
    #[error("settings file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with file path and serde_yaml line context.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A key parsed but holds an unusable value.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// `dirs::home_dir()` returned `None` and no `state_dir` was configured.
    #[error("cannot determine home directory; set $HOME or `state_dir`")]
    HomeNotFound,
}

/// Errors raised while reading or validating mirror description files.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mirror file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("mirror file {path} is not valid UTF-8: {source}")]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The document parsed but is not a key/value mapping.
    #[error("mirror file {path} is not a mapping")]
    NotAMapping { path: PathBuf },

    /// The path does not end in `.yaml`.
    #[error("{path} is not a mirror file (expected a .yaml suffix)")]
    NotAMirrorFile { path: PathBuf },

    #[error("{path}: missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: field `{field}` {reason}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },

    /// The file stem and the `Name` key disagree.
    #[error("{file}: filename does not match the name of the mirror (`{name}`)")]
    NameMismatch { file: MirrorName, name: String },

    /// The mirrors directory is absent (bad checkout or failed clone).
    #[error("mirrors directory does not exist: {path}")]
    MirrorsDirMissing { path: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}
