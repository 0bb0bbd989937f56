// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod lifecycle;
pub mod logging;
pub mod reload;
pub mod signal;
pub mod types;
pub mod watch;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, validate_settings, Settings};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::lifecycle::{
    state_channel, Coordinator, LifecycleState, ShutdownReport, TerminationListener,
};
use crate::reload::{DebounceOptions, ReloadDebouncer};
use crate::signal::{probe_process, LibcSignaller, ProcessSignaller};
use crate::types::ReloadRequest;
use crate::watch::{
    index_directories, register_watch_set, BackendStreams, EventWatcher, ExclusionRules,
    NotifyBackend, ReloadFilter, WatchBackend, WatchSet,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and startup validation
/// - directory indexing + watch registration
/// - event watcher and reload debouncer workers
/// - SIGINT/SIGTERM handling and ordered shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(args.config.as_deref())?;
    let settings = validate_settings(Settings::from_sources(&args, cfg), &RealFileSystem)?;

    if settings.verbose {
        info!("--verbose {}", settings.verbose);
        info!("--path {}", settings.root.display());
        info!("--pid {:?}", settings.pid);
        info!("--tick {}", settings.tick.as_secs());
        info!("--signal {}", settings.signal);
    }

    let signaller: Arc<dyn ProcessSignaller> = Arc::new(LibcSignaller);
    let report = run_with(settings, signaller).await?;

    debug!(?report, "fs-reloader has stopped");
    Ok(())
}

/// Start everything for already-validated `settings` and block until a
/// termination request has been fully processed.
pub async fn run_with(
    settings: Settings,
    signaller: Arc<dyn ProcessSignaller>,
) -> Result<ShutdownReport> {
    let termination = TerminationListener::install()?;
    let backend = NotifyBackend::new()?;

    let running = start(
        &settings,
        &RealFileSystem,
        backend,
        signaller,
        termination.wait(),
    )?;
    info!("started fs-reloader");

    let report = running.done.await.map_err(anyhow::Error::from)?;
    info!("fs-reloader has stopped");
    Ok(report)
}

/// Handles to a reloader whose workers are running.
#[derive(Debug)]
pub struct Running {
    /// Directories registered with the backend.
    pub watch_set: WatchSet,
    /// Lifecycle state as published by the coordinator.
    pub state: tokio::sync::watch::Receiver<LifecycleState>,
    /// Completes once `termination` has resolved and shutdown has finished.
    pub done: oneshot::Receiver<ShutdownReport>,
}

/// Probe the monitored process, index and register the watch set, then spawn
/// the event watcher, the debouncer (unless log-only) and the coordinator.
///
/// Every error is a startup failure: nothing has been spawned when it is
/// returned.
pub fn start<B, F>(
    settings: &Settings,
    fs: &dyn FileSystem,
    (mut backend, streams): (B, BackendStreams),
    signaller: Arc<dyn ProcessSignaller>,
    termination: F,
) -> Result<Running>
where
    B: WatchBackend,
    F: Future + Send + 'static,
{
    // Starting: every failure below is fatal and nothing is running yet.
    if let Some(pid) = settings.pid {
        probe_process(signaller.as_ref(), pid)?;
    } else {
        warn!("no --pid given; changes will be logged but no reload signal is sent");
    }

    let rules = ExclusionRules::from_config(&settings.watch);
    let watch_set = index_directories(fs, &settings.root, &rules)?;
    register_watch_set(&mut backend, &watch_set)?;
    info!(dirs = watch_set.len(), "watching {}", settings.root.display());

    let (state_tx, state_rx) = state_channel();
    let filter = ReloadFilter::from_config(&settings.watch);

    let coordinator = match settings.pid {
        Some(pid) => {
            let (reload_tx, reload_rx) = mpsc::channel::<ReloadRequest>(1);
            let (stop_tx, stop_rx) = oneshot::channel();
            let watcher = EventWatcher::new(streams, filter, Some(reload_tx)).spawn();
            let debouncer = ReloadDebouncer::new(
                DebounceOptions {
                    pid,
                    signal: settings.signal,
                    tick: settings.tick,
                },
                reload_rx,
                stop_rx,
                state_rx.clone(),
                signaller,
            )
            .spawn();
            Coordinator::new(backend, watcher, state_tx).with_debouncer(stop_tx, debouncer)
        }
        None => {
            let watcher = EventWatcher::new(streams, filter, None).spawn();
            Coordinator::new(backend, watcher, state_tx)
        }
    };

    let done = coordinator.spawn(termination);
    Ok(Running {
        watch_set,
        state: state_rx,
        done,
    })
}
