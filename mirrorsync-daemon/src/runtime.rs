use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use mirrorsync_core::Settings;
use mirrorsync_sync::{
    CommandRunner, DryRunRunner, Pipeline, ReconcileReport, SyncError, SystemRunner,
};

use crate::error::{io_err, DaemonError};

/// Runner used outside tests: real processes, optionally behind a dry run.
pub type BoxedRunner = Box<dyn CommandRunner + Send>;

/// Process-level options that are not part of the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Log registry writes instead of running them; no state is recorded.
    pub dry_run: bool,
    /// Stands in for an unset `workdir`.
    pub cwd: PathBuf,
}

/// Clone, run the initial pass, then refresh forever. Blocks the current
/// thread until Ctrl-C or the first failure.
pub fn start_blocking(settings: Settings, options: RunOptions) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings, options))
}

/// Async body of [`start_blocking`].
pub async fn run(settings: Settings, options: RunOptions) -> Result<(), DaemonError> {
    let pipeline = build_pipeline(&settings, &options)?;
    tracing::info!(
        checkout = %pipeline.checkout().display(),
        interval_secs = settings.sleep_time,
        dry_run = options.dry_run,
        "starting mirror reconciliation"
    );

    let (pipeline, _) = on_blocking_thread(pipeline, |p| {
        p.bootstrap()?;
        p.initial_pass()
    })
    .await?;

    run_loop(pipeline, settings.interval(), ctrl_c()).await?;
    Ok(())
}

/// Clone and run the initial pass only.
pub fn run_once(settings: &Settings, options: &RunOptions) -> Result<ReconcileReport, DaemonError> {
    init_tracing();
    let mut pipeline = build_pipeline(settings, options)?;
    pipeline.bootstrap()?;
    Ok(pipeline.initial_pass()?)
}

/// Refresh pass, then sleep `interval`, until `shutdown` resolves.
///
/// `shutdown` is only observed while sleeping, so a pass always runs to
/// completion. Returns the pipeline so callers can inspect its runner.
pub async fn run_loop<R, S>(
    mut pipeline: Pipeline<R>,
    interval: Duration,
    shutdown: S,
) -> Result<Pipeline<R>, DaemonError>
where
    R: CommandRunner + Send + 'static,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let (next, report) = on_blocking_thread(pipeline, |p| p.refresh_pass()).await?;
        pipeline = next;
        if report.is_noop() {
            tracing::debug!("no mirror changes");
        }

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down mirror reconciliation");
                return Ok(pipeline);
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Build the production pipeline for `settings`.
pub fn build_pipeline(
    settings: &Settings,
    options: &RunOptions,
) -> Result<Pipeline<BoxedRunner>, DaemonError> {
    let runner: BoxedRunner = if options.dry_run {
        Box::new(DryRunRunner::new(SystemRunner))
    } else {
        Box::new(SystemRunner)
    };
    let state_root = if options.dry_run {
        None
    } else {
        Some(settings.state_root()?)
    };
    Ok(Pipeline::new(runner, settings, &options.cwd, state_root)?)
}

/// Move `pipeline` onto the blocking pool for one step and hand it back.
async fn on_blocking_thread<R, T, F>(
    mut pipeline: Pipeline<R>,
    step: F,
) -> Result<(Pipeline<R>, T), DaemonError>
where
    R: CommandRunner + Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut Pipeline<R>) -> Result<T, SyncError> + Send + 'static,
{
    let (pipeline, result) = tokio::task::spawn_blocking(move || {
        let result = step(&mut pipeline);
        (pipeline, result)
    })
    .await?;
    Ok((pipeline, result?))
}

/// Resolves on the first Ctrl-C. If the handler cannot be installed the
/// loop simply runs until a pass fails.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c"),
        Err(err) => {
            tracing::warn!(error = %err, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    }
}

/// Install the global `tracing` subscriber once. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
