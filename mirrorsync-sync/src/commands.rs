//! Invocation builders for the two external tools: git and the mirror registry.
//!
//! Builders are pure; running them is the [`CommandRunner`](crate::exec::CommandRunner)'s job.

use std::collections::BTreeSet;
use std::path::Path;

use mirrorsync_core::{MirrorField, MirrorName, MirrorRecord};

use crate::exec::Invocation;

// ---------------------------------------------------------------------------
// Mirror registry
// ---------------------------------------------------------------------------

/// `mirrorbits` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCli {
    program: String,
}

impl RegistryCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `mirrorbits list`: plain-text rows, see [`parse_listing`].
    pub fn list(&self) -> Invocation {
        Invocation::new(&self.program).arg("list")
    }

    /// `mirrorbits add -admin-email=… … <name>`, one flag per field.
    pub fn add(&self, record: &MirrorRecord) -> Invocation {
        let flags = MirrorField::ALL
            .into_iter()
            .map(|field| format!("-{}={}", field.flag(), record.get(field)));
        Invocation::new(&self.program)
            .arg("add")
            .args(flags)
            .arg(record.name.as_str())
            .mutating()
    }

    pub fn enable(&self, name: &MirrorName) -> Invocation {
        Invocation::new(&self.program)
            .args(["enable", name.as_str()])
            .mutating()
    }

    pub fn disable(&self, name: &MirrorName) -> Invocation {
        Invocation::new(&self.program)
            .args(["disable", name.as_str()])
            .mutating()
    }

    /// `enable` or `disable` according to the record's `Enabled` field.
    pub fn toggle(&self, record: &MirrorRecord) -> Invocation {
        if record.enabled {
            self.enable(&record.name)
        } else {
            self.disable(&record.name)
        }
    }

    /// `mirrorbits edit -mirror-file <path> <name>`: replace the mirror's
    /// configuration with the file's contents.
    pub fn edit(&self, mirror_file: &Path, name: &MirrorName) -> Invocation {
        Invocation::new(&self.program)
            .args(["edit", "-mirror-file"])
            .arg(mirror_file.to_string_lossy())
            .arg(name.as_str())
            .mutating()
    }

    /// `mirrorbits remove <name>`; the registry asks for confirmation.
    pub fn remove(&self, name: &MirrorName) -> Invocation {
        Invocation::new(&self.program)
            .args(["remove", name.as_str()])
            .confirmed()
            .mutating()
    }
}

/// Mirror names from `mirrorbits list` output.
///
/// The first row is a header; each following non-empty row starts with the
/// mirror identifier.
pub fn parse_listing(stdout: &str) -> BTreeSet<MirrorName> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(MirrorName::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCli {
    program: String,
    sync_args: Vec<String>,
}

impl GitCli {
    pub fn new(program: impl Into<String>, sync_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            sync_args,
        }
    }

    /// `git clone <url> <dest>`
    pub fn clone_repo(&self, url: &str, dest: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(["clone", url])
            .arg(dest.to_string_lossy())
    }

    /// `git <sync_args…>` run inside the checkout.
    ///
    /// Confirmation answers are fed on stdin since some sync helpers prompt
    /// before resetting the branch.
    pub fn sync(&self, checkout: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(self.sync_args.iter().cloned())
            .in_dir(checkout)
            .confirmed()
    }
}
