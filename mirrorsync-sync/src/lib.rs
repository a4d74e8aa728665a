//! # mirrorsync-sync
//!
//! Snapshot, diff and reconcile a directory of mirror files against the
//! mirror registry.
//!
//! Build a [`Pipeline`] with a [`CommandRunner`] and drive its passes; the
//! CLI and the daemon share it.

pub mod commands;
pub mod error;
pub mod exec;
pub mod pipeline;
pub mod plan;
pub mod reconcile;
pub mod snapshot;
pub mod state;
pub mod table;

pub use error::SyncError;
pub use exec::{CommandRunner, DryRunRunner, Invocation, RecordingRunner, SystemRunner};
pub use pipeline::Pipeline;
pub use plan::{Baseline, Plan};
pub use reconcile::{PassCounts, ReconcileReport};
pub use snapshot::Snapshot;
pub use state::{PassKind, SyncState};
