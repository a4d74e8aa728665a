//! Startup settings, read once at launch.
//!
//! ```yaml
//! fork_url: https://gitee.com/openeuler/infrastructure.git
//! mirrors_dir: mirrors
//! sleep_time: 300
//! ```
//!
//! Only the three keys above are required; everything else has a default.
//! Unknown keys are ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "refresh_mirrors.yaml";

const STATE_DIR_NAME: &str = ".mirrorsync";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Remote repository holding the mirror description files.
    pub fork_url: String,
    /// Directory of mirror files, relative to the checkout root.
    pub mirrors_dir: PathBuf,
    /// Seconds to wait between refresh passes.
    pub sleep_time: u64,

    /// Directory the checkout is cloned into. Defaults to the process cwd.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// Checkout directory name. Defaults to the repository name in `fork_url`.
    #[serde(default)]
    pub checkout_name: Option<String>,
    #[serde(default = "default_registry_bin")]
    pub registry_bin: String,
    #[serde(default = "default_git_bin")]
    pub git_bin: String,
    /// Arguments after `git` that bring the checkout up to date.
    #[serde(default = "default_git_sync_args")]
    pub git_sync_args: Vec<String>,
    /// Where the last pass is recorded. Defaults to `~/.mirrorsync`.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

fn default_registry_bin() -> String {
    "mirrorbits".to_string()
}

fn default_git_bin() -> String {
    "git".to_string()
}

fn default_git_sync_args() -> Vec<String> {
    vec!["pull".to_string(), "--ff-only".to_string()]
}

impl Settings {
    /// Parse settings from YAML text and validate them.
    pub fn from_yaml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fork_url.trim().is_empty() {
            return Err(invalid("fork_url", "must not be empty"));
        }
        if self.sleep_time == 0 {
            return Err(invalid("sleep_time", "must be at least one second"));
        }
        if self.mirrors_dir.as_os_str().is_empty() || self.mirrors_dir.is_absolute() {
            return Err(invalid(
                "mirrors_dir",
                "must be a relative path inside the checkout",
            ));
        }
        if self.git_sync_args.is_empty() {
            return Err(invalid("git_sync_args", "must name at least one argument"));
        }
        if self.checkout_name()?.is_empty() {
            return Err(invalid("fork_url", "cannot derive a checkout directory name"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sleep_time)
    }

    /// Directory name of the local clone.
    pub fn checkout_name(&self) -> Result<String, ConfigError> {
        match &self.checkout_name {
            Some(name) if name.contains('/') || name == "." || name == ".." => {
                Err(invalid("checkout_name", "must be a plain directory name"))
            }
            Some(name) => Ok(name.clone()),
            None => Ok(repo_name_from_url(&self.fork_url)),
        }
    }

    /// `<workdir>/<checkout_name>`; `cwd` stands in for an unset `workdir`.
    pub fn checkout_dir(&self, cwd: &Path) -> Result<PathBuf, ConfigError> {
        let base = self.workdir.as_deref().unwrap_or(cwd);
        Ok(base.join(self.checkout_name()?))
    }

    /// `<checkout>/<mirrors_dir>`
    pub fn mirrors_path(&self, cwd: &Path) -> Result<PathBuf, ConfigError> {
        Ok(self.checkout_dir(cwd)?.join(&self.mirrors_dir))
    }

    /// Configured `state_dir`, else `<home>/.mirrorsync`.
    pub fn state_root_at(&self, home: &Path) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| home.join(STATE_DIR_NAME))
    }

    /// `state_root_at` using `dirs::home_dir()` when no `state_dir` is set.
    pub fn state_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(self.state_root_at(&home))
    }
}

/// Load settings from the YAML file at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed.
pub fn load_at(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Settings::from_yaml(path, &contents)
}

/// Last path segment of a repository URL without a trailing `.git`.
///
/// Handles both `https://host/org/repo.git` and `git@host:org/repo.git`.
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
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

    const MINIMAL: &str = "fork_url: https://gitee.com/openeuler/infrastructure.git\n\
                           mirrors_dir: mirrors\n\
                           sleep_time: 300\n";

    fn parse(contents: &str) -> Result<Settings, ConfigError> {
        Settings::from_yaml(Path::new("refresh_mirrors.yaml"), contents)
    }

    #[test]
    fn minimal_settings_fill_defaults() {
        let settings = parse(MINIMAL).expect("parse");
        assert_eq!(settings.mirrors_dir, PathBuf::from("mirrors"));
        assert_eq!(settings.interval(), Duration::from_secs(300));
        assert_eq!(settings.registry_bin, "mirrorbits");
        assert_eq!(settings.git_bin, "git");
        assert_eq!(settings.git_sync_args, vec!["pull", "--ff-only"]);
        assert_eq!(settings.checkout_name().unwrap(), "infrastructure");
    }

    #[rstest]
    #[case("https://gitee.com/openeuler/infrastructure.git", "infrastructure")]
    #[case("https://github.com/org/mirrors", "mirrors")]
    #[case("https://github.com/org/mirrors/", "mirrors")]
    #[case("git@github.com:org/mirror-list.git", "mirror-list")]
    #[case("git@host:solo.git", "solo")]
    fn repo_name_derivation(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(repo_name_from_url(url), expected);
    }

    #[test]
    fn checkout_dir_prefers_workdir_over_cwd() {
        let mut settings = parse(MINIMAL).unwrap();
        let cwd = Path::new("/srv/cwd");
        assert_eq!(
            settings.checkout_dir(cwd).unwrap(),
            PathBuf::from("/srv/cwd/infrastructure")
        );
        settings.workdir = Some(PathBuf::from("/var/lib/mirrorsync"));
        assert_eq!(
            settings.mirrors_path(cwd).unwrap(),
            PathBuf::from("/var/lib/mirrorsync/infrastructure/mirrors")
        );
    }

    #[test]
    fn state_root_defaults_under_home() {
        let settings = parse(MINIMAL).unwrap();
        assert_eq!(
            settings.state_root_at(Path::new("/home/ops")),
            PathBuf::from("/home/ops/.mirrorsync")
        );
    }

    #[rstest]
    #[case("sleep_time: 0", "sleep_time")]
    #[case("mirrors_dir: /abs/mirrors", "mirrors_dir")]
    #[case("fork_url: \"  \"", "fork_url")]
    fn invalid_values_are_rejected(#[case] line: &str, #[case] field: &str) {
        let key = line.split(':').next().unwrap();
        let contents: String = MINIMAL
            .lines()
            .map(|l| if l.starts_with(key) { line } else { l })
            .collect::<Vec<_>>()
            .join("\n");
        match parse(&contents).unwrap_err() {
            ConfigError::Invalid { field: got, .. } => assert_eq!(got, field),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_key_is_parse_error() {
        let err = parse("fork_url: x\nmirrors_dir: mirrors\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("refresh_mirrors.yaml"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings = parse(&format!("{MINIMAL}mirrorbits_conf: /etc/mirrorbits.conf\n"))
            .expect("parse");
        assert_eq!(settings, parse(MINIMAL).expect("parse"));
    }

    #[test]
    fn load_missing_file_returns_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_at(&dir.path().join("refresh_mirrors.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh_mirrors.yaml");
        std::fs::write(&path, format!("{MINIMAL}git_sync_args: [sync]\n")).unwrap();
        let settings = load_at(&path).expect("load");
        assert_eq!(settings.git_sync_args, vec!["sync"]);
    }
}
