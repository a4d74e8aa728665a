//! mirrorsync core library: domain types, settings, mirror files, errors.
//!
//! - [`types`]: [`MirrorName`], [`MirrorField`], [`MirrorRecord`]
//! - [`mirror`]: parse / validate / list mirror description files
//! - [`config`]: startup [`Settings`]
//! - [`error`]: [`ConfigError`], [`MirrorError`]

pub mod config;
pub mod error;
pub mod mirror;
pub mod types;

pub use config::Settings;
pub use error::{ConfigError, MirrorError};
pub use types::{MirrorField, MirrorName, MirrorRecord};
