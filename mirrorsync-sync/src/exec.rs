//! External process invocation.
//!
//! Everything the pipeline does to the outside world (git, the mirror
//! registry) goes through [`CommandRunner`]. Commands are judged by exit
//! status alone; stdout is only kept for callers that parse it.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::SyncError;

/// Answers written to stdin of commands that prompt for confirmation.
const CONFIRM_ANSWERS: &str = "y\ny\ny\ny\n";

/// A single program invocation, built before it is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
    /// Feed `y` answers on stdin.
    pub confirm: bool,
    /// Changes registry state; skipped under [`DryRunRunner`].
    pub mutating: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            confirm: false,
            mutating: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    /// First argument, e.g. `add` in `mirrorbits add …`.
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs invocations. A non-zero exit must surface as an error.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError> {
        (**self).run(invocation)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError> {
        (**self).run(invocation)
    }
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError> {
        let command_line = invocation.to_string();
        let spawn_err = |source: std::io::Error| SyncError::Spawn {
            command: command_line.clone(),
            source,
        };

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(if invocation.confirm {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %command_line, "running");
        let mut child = cmd.spawn().map_err(spawn_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without prompting closes the pipe early.
            let _ = stdin.write_all(CONFIRM_ANSWERS.as_bytes());
        }
        let output = child.wait_with_output().map_err(spawn_err)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(SyncError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

// ---------------------------------------------------------------------------
// DryRunRunner
// ---------------------------------------------------------------------------

/// Logs mutating invocations instead of running them.
///
/// Read-only invocations (git, `mirrorbits list`) still reach `inner`, so a
/// dry run sees the real registry and checkout.
#[derive(Debug)]
pub struct DryRunRunner<R> {
    inner: R,
    skipped: Vec<Invocation>,
}

impl<R> DryRunRunner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            skipped: Vec::new(),
        }
    }

    /// Invocations that would have run.
    pub fn skipped(&self) -> &[Invocation] {
        &self.skipped
    }
}

impl<R: CommandRunner> CommandRunner for DryRunRunner<R> {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError> {
        if invocation.mutating {
            tracing::info!("[dry-run] would run: {invocation}");
            self.skipped.push(invocation.clone());
            return Ok(CommandOutput::default());
        }
        self.inner.run(invocation)
    }
}

// ---------------------------------------------------------------------------
// RecordingRunner
// ---------------------------------------------------------------------------

type Effect = Box<dyn FnMut() -> std::io::Result<()> + Send>;

/// In-memory runner that records every invocation instead of spawning.
///
/// Invocations are matched on `(program, subcommand)`; stubs supply stdout,
/// effects mutate the filesystem the way the real program would, and
/// failures turn into [`SyncError::CommandFailed`].
#[derive(Default)]
pub struct RecordingRunner {
    invocations: Vec<Invocation>,
    stubs: Vec<(String, String, String)>,
    effects: Vec<(String, String, Effect)>,
    failures: Vec<(String, String)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `program subcommand` with `stdout`.
    pub fn stub(mut self, program: &str, subcommand: &str, stdout: impl Into<String>) -> Self {
        self.stubs
            .push((program.to_string(), subcommand.to_string(), stdout.into()));
        self
    }

    /// Run `effect` whenever `program subcommand` is invoked.
    pub fn on<F>(mut self, program: &str, subcommand: &str, effect: F) -> Self
    where
        F: FnMut() -> std::io::Result<()> + Send + 'static,
    {
        self.effects
            .push((program.to_string(), subcommand.to_string(), Box::new(effect)));
        self
    }

    /// Make `program subcommand` exit non-zero.
    pub fn fail(mut self, program: &str, subcommand: &str) -> Self {
        self.failures
            .push((program.to_string(), subcommand.to_string()));
        self
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// `"program subcommand"` for every recorded invocation, in order.
    pub fn calls(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|inv| format!("{} {}", inv.program, inv.subcommand().unwrap_or_default()))
            .collect()
    }

    /// Recorded invocations of `program subcommand`.
    pub fn matching(&self, program: &str, subcommand: &str) -> Vec<&Invocation> {
        self.invocations
            .iter()
            .filter(|inv| matches(inv, program, subcommand))
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<CommandOutput, SyncError> {
        self.invocations.push(invocation.clone());

        for (program, subcommand, effect) in &mut self.effects {
            if matches(invocation, program, subcommand) {
                effect().map_err(|e| crate::error::io_err(invocation.to_string(), e))?;
            }
        }

        if self
            .failures
            .iter()
            .any(|(program, subcommand)| matches(invocation, program, subcommand))
        {
            return Err(SyncError::CommandFailed {
                command: invocation.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "injected failure".to_string(),
            });
        }

        let stdout = self
            .stubs
            .iter()
            .find(|(program, subcommand, _)| matches(invocation, program, subcommand))
            .map(|(_, _, stdout)| stdout.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }
}

fn matches(invocation: &Invocation, program: &str, subcommand: &str) -> bool {
    invocation.program == program && invocation.subcommand() == Some(subcommand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_args_with_spaces() {
        let inv = Invocation::new("mirrorbits")
            .arg("add")
            .arg("-admin-name=Tuna Ops")
            .arg("")
            .arg("tuna");
        assert_eq!(
            inv.to_string(),
            r#"mirrorbits add "-admin-name=Tuna Ops" "" tuna"#
        );
    }

    #[test]
    fn builder_sets_flags() {
        let inv = Invocation::new("git")
            .args(["pull", "--ff-only"])
            .in_dir("/srv/repo")
            .confirmed();
        assert_eq!(inv.subcommand(), Some("pull"));
        assert!(inv.confirm);
        assert!(!inv.mutating);
        assert_eq!(inv.current_dir, Some(PathBuf::from("/srv/repo")));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let out = SystemRunner
            .run(&Invocation::new("sh").args(["-c", "echo hello"]))
            .expect("run");
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_nonzero_exit_is_error() {
        let err = SystemRunner
            .run(&Invocation::new("sh").args(["-c", "echo nope >&2; exit 3"]))
            .unwrap_err();
        match err {
            SyncError::CommandFailed { stderr, status, .. } => {
                assert_eq!(stderr, "nope");
                assert!(status.contains('3'), "status: {status}");
            }
            other => panic!("expected command failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_feeds_confirmation() {
        let out = SystemRunner
            .run(
                &Invocation::new("sh")
                    .args(["-c", "read answer; echo got-$answer"])
                    .confirmed(),
            )
            .expect("run");
        assert_eq!(out.stdout.trim(), "got-y");
    }

    #[test]
    fn system_runner_missing_binary_is_spawn_error() {
        let err = SystemRunner
            .run(&Invocation::new("mirrorsync-definitely-not-installed"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Spawn { .. }), "got: {err}");
    }

    #[test]
    fn dry_run_skips_only_mutating_invocations() {
        let mut runner = DryRunRunner::new(RecordingRunner::new().stub("mirrorbits", "list", "x"));
        let listed = runner
            .run(&Invocation::new("mirrorbits").arg("list"))
            .expect("list");
        assert_eq!(listed.stdout, "x");
        runner
            .run(&Invocation::new("mirrorbits").arg("remove").mutating())
            .expect("remove");

        assert_eq!(runner.skipped().len(), 1);
        assert_eq!(runner.inner.calls(), vec!["mirrorbits list"]);
    }

    #[test]
    fn recording_runner_injects_failure_after_recording() {
        let mut runner = RecordingRunner::new().fail("git", "clone");
        assert!(runner.run(&Invocation::new("git").arg("clone")).is_err());
        assert_eq!(runner.calls(), vec!["git clone"]);
    }
}
