//! Point-in-time view of the mirrors directory.
//!
//! A snapshot keeps the full contents of every mirror file so the
//! before/after comparison is byte-exact, plus a SHA-256 digest for the
//! state file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use mirrorsync_core::{mirror, MirrorError, MirrorName};

use crate::error::{io_err, SyncError};

/// One mirror file as captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFile {
    /// Absolute path, usable from any working directory.
    pub path: PathBuf,
    /// Raw bytes; only files that are parsed need to be UTF-8.
    pub contents: Vec<u8>,
    pub digest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub files: BTreeMap<MirrorName, MirrorFile>,
}

impl Snapshot {
    /// Read every `*.yaml` file in `dir`.
    ///
    /// Returns `MirrorError::MirrorsDirMissing` if `dir` does not exist.
    pub fn capture(dir: &Path) -> Result<Self, SyncError> {
        if !dir.is_dir() {
            return Err(MirrorError::MirrorsDirMissing {
                path: dir.to_path_buf(),
            }
            .into());
        }
        let dir = std::fs::canonicalize(dir).map_err(|e| io_err(dir, e))?;

        let mut files = BTreeMap::new();
        for (name, path) in mirror::list_mirror_files(&dir)? {
            let contents = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
            let digest = digest(&contents);
            files.insert(
                name,
                MirrorFile {
                    path,
                    contents,
                    digest,
                },
            );
        }
        Ok(Self { files })
    }

    pub fn get(&self, name: &MirrorName) -> Option<&MirrorFile> {
        self.files.get(name)
    }

    pub fn names(&self) -> BTreeSet<MirrorName> {
        self.files.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `name → digest`, the shape persisted in the state file.
    pub fn digests(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|(name, file)| (name.0.clone(), file.digest.clone()))
            .collect()
    }
}

/// SHA-256 hex digest of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn capture_reads_yaml_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tuna.yaml"), "Name: tuna\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "# mirrors").unwrap();

        let snapshot = Snapshot::capture(dir.path()).expect("capture");
        assert_eq!(snapshot.len(), 1);
        let file = snapshot.get(&MirrorName::from("tuna")).expect("tuna");
        assert_eq!(file.contents, b"Name: tuna\n");
        assert_eq!(file.digest, digest(b"Name: tuna\n"));
        assert!(file.path.is_absolute());
    }

    #[test]
    fn capture_keeps_non_utf8_bytes() {
        let dir = TempDir::new().unwrap();
        let legacy = b"# M\xfcnchen\nName: legacy\n";
        std::fs::write(dir.path().join("legacy.yaml"), legacy).unwrap();

        let snapshot = Snapshot::capture(dir.path()).expect("capture");
        let file = snapshot.get(&MirrorName::from("legacy")).expect("legacy");
        assert_eq!(file.contents, legacy);
        assert_eq!(file.digest, digest(legacy));
    }

    #[test]
    fn capture_missing_dir_is_mirror_error() {
        let dir = TempDir::new().unwrap();
        let err = Snapshot::capture(&dir.path().join("mirrors")).unwrap_err();
        assert!(
            matches!(err, SyncError::Mirror(MirrorError::MirrorsDirMissing { .. })),
            "got: {err}"
        );
    }

    #[test]
    fn empty_dir_is_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot::capture(dir.path()).expect("capture");
        assert!(snapshot.is_empty());
        assert!(snapshot.digests().is_empty());
    }

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
