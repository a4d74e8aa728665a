//! Mirror description files.
//!
//! # Layout
//!
//! ```text
//! <checkout>/
//!   <mirrors_dir>/
//!     <name>.yaml      (one mirror per file; `Name:` must equal <name>)
//! ```
//!
//! Every key listed in [`MirrorField::ALL`] plus `Name` and `Enabled` is
//! required. Values are rendered to strings without interpretation:
//! booleans become `true`/`false`, numbers keep their YAML form and null
//! becomes the empty string.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{io_err, MirrorError};
use crate::types::{MirrorField, MirrorName, MirrorRecord};

pub const NAME_KEY: &str = "Name";
pub const ENABLED_KEY: &str = "Enabled";

// ---------------------------------------------------------------------------
// 1. Parse
// ---------------------------------------------------------------------------

/// Parse and validate the contents of the mirror file at `path`.
///
/// `path` is only used for its file name and for error context; nothing is
/// read from disk. Checks run in order: file name, YAML shape, `Name`
/// against the file stem, then every remaining required field.
pub fn parse_mirror(path: &Path, contents: &str) -> Result<MirrorRecord, MirrorError> {
    let (file, mapping) = named_mapping(path, contents)?;

    let mut values = BTreeMap::new();
    for field in MirrorField::ALL {
        let value = require(path, &mapping, field.key())?;
        values.insert(field, render_scalar(path, field.key(), value)?);
    }

    let enabled = parse_enabled(path, require(path, &mapping, ENABLED_KEY)?)?;

    Ok(MirrorRecord {
        name: file,
        values,
        enabled,
    })
}

/// Check only that `Name` matches the file stem of `path`.
///
/// Other fields are not looked at; a changed file is handed to the registry
/// as it is.
pub fn check_name(path: &Path, contents: &str) -> Result<MirrorName, MirrorError> {
    named_mapping(path, contents).map(|(file, _)| file)
}

/// View raw file bytes as UTF-8 text.
pub fn decode<'a>(path: &Path, bytes: &'a [u8]) -> Result<&'a str, MirrorError> {
    std::str::from_utf8(bytes).map_err(|e| MirrorError::NotUtf8 {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse the mirror file at `path`.
pub fn load_mirror(path: &Path) -> Result<MirrorRecord, MirrorError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    parse_mirror(path, decode(path, &bytes)?)
}

// ---------------------------------------------------------------------------
// 2. Directory listing
// ---------------------------------------------------------------------------

/// Names of every `*.yaml` file directly inside `dir`.
///
/// Returns `MirrorError::MirrorsDirMissing` if `dir` is not a directory.
pub fn list_mirror_names(dir: &Path) -> Result<BTreeSet<MirrorName>, MirrorError> {
    Ok(list_mirror_files(dir)?.into_keys().collect())
}

/// `name → path` for every `*.yaml` file directly inside `dir`.
pub fn list_mirror_files(dir: &Path) -> Result<BTreeMap<MirrorName, PathBuf>, MirrorError> {
    if !dir.is_dir() {
        return Err(MirrorError::MirrorsDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files = BTreeMap::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        if ty.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(MirrorName::from_file_name) else {
            continue;
        };
        files.insert(name, entry.path());
    }
    Ok(files)
}

/// Load every mirror file in `dir` and collect the ones that fail.
///
/// An empty result means the whole directory is valid.
pub fn validate_dir(dir: &Path) -> Result<Vec<(PathBuf, MirrorError)>, MirrorError> {
    let mut failures = Vec::new();
    for (_name, path) in list_mirror_files(dir)? {
        if let Err(err) = load_mirror(&path) {
            failures.push((path, err));
        }
    }
    Ok(failures)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn named_mapping(path: &Path, contents: &str) -> Result<(MirrorName, Mapping), MirrorError> {
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(MirrorName::from_file_name)
        .ok_or_else(|| MirrorError::NotAMirrorFile {
            path: path.to_path_buf(),
        })?;

    let document: Value = serde_yaml::from_str(contents).map_err(|e| MirrorError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let Value::Mapping(mapping) = document else {
        return Err(MirrorError::NotAMapping {
            path: path.to_path_buf(),
        });
    };

    let name = render_scalar(path, NAME_KEY, require(path, &mapping, NAME_KEY)?)?;
    if name != file.0 {
        return Err(MirrorError::NameMismatch { file, name });
    }
    Ok((file, mapping))
}

fn require<'a>(path: &Path, mapping: &'a Mapping, key: &'static str) -> Result<&'a Value, MirrorError> {
    mapping.get(key).ok_or_else(|| MirrorError::MissingField {
        path: path.to_path_buf(),
        field: key,
    })
}

fn render_scalar(path: &Path, key: &'static str, value: &Value) -> Result<String, MirrorError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Tagged(tagged) => render_scalar(path, key, &tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(MirrorError::InvalidField {
            path: path.to_path_buf(),
            field: key,
            reason: "must be a scalar".to_string(),
        }),
    }
}

fn parse_enabled(path: &Path, value: &Value) -> Result<bool, MirrorError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(MirrorError::InvalidField {
            path: path.to_path_buf(),
            field: ENABLED_KEY,
            reason: "must be a boolean".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const TUNA: &str = r#"
Name: tuna
AdminEmail: admin@tuna.example
AdminName: Tuna Ops
ASOnly: false
ContinentOnly: false
CountryOnly: true
FtpURL:
HttpURL: https://mirrors.tuna.example/openeuler/
RsyncURL: rsync://mirrors.tuna.example/openeuler/
Score: 100
SponsorLogoURL: https://tuna.example/logo.png
SponsorName: TUNA
SponsorURL: https://tuna.example
NetworkBandwidth: 10000
Latitude: 39.99
Longitude: 116.31
Country: CN
Enabled: true
"#;

    fn path(name: &str) -> PathBuf {
        PathBuf::from("/repo/mirrors").join(name)
    }

    #[test]
    fn parses_complete_record() {
        let record = parse_mirror(&path("tuna.yaml"), TUNA).expect("parse");
        assert_eq!(record.name, MirrorName::from("tuna"));
        assert!(record.enabled);
        assert_eq!(record.get(MirrorField::AdminEmail), "admin@tuna.example");
        assert_eq!(record.get(MirrorField::Score), "100");
        assert_eq!(record.get(MirrorField::Latitude), "39.99");
        assert_eq!(record.get(MirrorField::CountryOnly), "true");
        assert_eq!(record.get(MirrorField::FtpUrl), "", "null renders empty");
        assert_eq!(record.values.len(), MirrorField::ALL.len());
    }

    #[rstest]
    #[case("AdminEmail")]
    #[case("Score")]
    #[case("SponsorURL")]
    #[case("Country")]
    #[case("Enabled")]
    fn missing_field_is_reported_by_key(#[case] key: &str) {
        let contents: String = TUNA
            .lines()
            .filter(|line| !line.starts_with(&format!("{key}:")))
            .collect::<Vec<_>>()
            .join("\n");
        let err = parse_mirror(&path("tuna.yaml"), &contents).unwrap_err();
        match err {
            MirrorError::MissingField { field, .. } => assert_eq!(field, key),
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn name_mismatch_is_rejected() {
        let err = parse_mirror(&path("ustc.yaml"), TUNA).unwrap_err();
        match &err {
            MirrorError::NameMismatch { file, name } => {
                assert_eq!(file.0, "ustc");
                assert_eq!(name, "tuna");
            }
            other => panic!("expected name mismatch, got {other:?}"),
        }
        assert!(err.to_string().contains("filename does not match"));
    }

    #[test]
    fn name_is_checked_before_other_fields() {
        let err = parse_mirror(&path("ustc.yaml"), "Name: tuna\n").unwrap_err();
        assert!(matches!(err, MirrorError::NameMismatch { .. }), "got: {err}");
    }

    #[test]
    fn check_name_ignores_other_fields() {
        let name = check_name(&path("tuna.yaml"), "Name: tuna\nScore: 7\n").expect("check");
        assert_eq!(name, MirrorName::from("tuna"));

        let err = check_name(&path("ustc.yaml"), "Name: tuna\n").unwrap_err();
        assert!(matches!(err, MirrorError::NameMismatch { .. }), "got: {err}");
    }

    #[test]
    fn decode_rejects_latin1_bytes() {
        let err = decode(&path("tuna.yaml"), b"Name: M\xfcnchen\n").unwrap_err();
        assert!(matches!(err, MirrorError::NotUtf8 { .. }), "got: {err}");
        assert_eq!(decode(&path("tuna.yaml"), b"Name: tuna\n").expect("utf-8"), "Name: tuna\n");
    }

    #[test]
    fn missing_name_is_a_missing_field() {
        let err = parse_mirror(&path("tuna.yaml"), "AdminEmail: a@b\n").unwrap_err();
        assert!(matches!(err, MirrorError::MissingField { field: "Name", .. }));
    }

    #[rstest]
    #[case("Enabled: yes-please")]
    #[case("Enabled: 1")]
    #[case("Enabled: [true]")]
    fn enabled_must_be_boolean(#[case] line: &str) {
        let contents = TUNA.replace("Enabled: true", line);
        let err = parse_mirror(&path("tuna.yaml"), &contents).unwrap_err();
        assert!(
            matches!(err, MirrorError::InvalidField { field: "Enabled", .. }),
            "got: {err}"
        );
    }

    #[test]
    fn enabled_accepts_string_form() {
        let contents = TUNA.replace("Enabled: true", "Enabled: \"False\"");
        let record = parse_mirror(&path("tuna.yaml"), &contents).expect("parse");
        assert!(!record.enabled);
    }

    #[test]
    fn sequence_value_is_invalid() {
        let contents = TUNA.replace("Country: CN", "Country: [CN, HK]");
        let err = parse_mirror(&path("tuna.yaml"), &contents).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidField { field: "Country", .. }));
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = parse_mirror(&path("tuna.yaml"), "- just\n- a list\n").unwrap_err();
        assert!(matches!(err, MirrorError::NotAMapping { .. }));
    }

    #[test]
    fn non_yaml_path_is_rejected() {
        let err = parse_mirror(&path("tuna.yml"), TUNA).unwrap_err();
        assert!(matches!(err, MirrorError::NotAMirrorFile { .. }));
    }

    #[test]
    fn list_skips_non_yaml_and_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tuna.yaml"), TUNA).unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let names = list_mirror_names(dir.path()).expect("list");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec![MirrorName::from("tuna")]);
    }

    #[test]
    fn list_missing_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = list_mirror_names(&dir.path().join("mirrors")).unwrap_err();
        assert!(matches!(err, MirrorError::MirrorsDirMissing { .. }));
    }
}
