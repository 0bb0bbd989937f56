// src/lifecycle/coordinator.rs

//! Ordered teardown of the watcher backend and both workers.

use std::future::Future;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::lifecycle::LifecycleState;
use crate::reload::DebounceStats;
use crate::watch::WatchBackend;

/// Summary handed to the main task once everything has stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// `None` in log-only mode.
    pub debounce: Option<DebounceStats>,
    /// Whether closing the backend reported an error.
    pub backend_close_failed: bool,
}

/// Running debouncer plus the switch that stops its tick timer.
#[derive(Debug)]
struct DebouncerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<DebounceStats>,
}

/// Owns everything that must be torn down, and the order to do it in.
///
/// It runs exactly once: [`Coordinator::spawn`] consumes it.
#[derive(Debug)]
pub struct Coordinator<B: WatchBackend> {
    backend: B,
    watcher: JoinHandle<()>,
    debouncer: Option<DebouncerHandle>,
    state_tx: watch::Sender<LifecycleState>,
}

impl<B: WatchBackend> Coordinator<B> {
    pub fn new(backend: B, watcher: JoinHandle<()>, state_tx: watch::Sender<LifecycleState>) -> Self {
        Self {
            backend,
            watcher,
            debouncer: None,
            state_tx,
        }
    }

    /// Attach the debouncer worker and the sender that stops its timer.
    pub fn with_debouncer(
        mut self,
        stop_tx: oneshot::Sender<()>,
        join: JoinHandle<DebounceStats>,
    ) -> Self {
        self.debouncer = Some(DebouncerHandle { stop_tx, join });
        self
    }

    /// Mark the process `Running` and wait on `termination` in a dedicated
    /// task. The returned receiver completes once shutdown has finished.
    pub fn spawn<F>(self, termination: F) -> oneshot::Receiver<ShutdownReport>
    where
        F: Future + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        self.state_tx.send_replace(LifecycleState::Running);

        tokio::spawn(async move {
            termination.await;
            let report = self.shutdown().await;
            if done_tx.send(report).is_err() {
                debug!("main task no longer waiting for shutdown");
            }
        });

        done_rx
    }

    /// Tear down in order:
    /// 1. publish `ShuttingDown` so no further reload is signalled,
    /// 2. close the backend, which ends both event streams,
    /// 3. wait for the event watcher to exit; its reload sender goes with it,
    ///    so the reload channel is closed with no sender left to misuse it,
    /// 4. stop the tick timer and wait for the debouncer,
    /// 5. publish `Stopped`.
    pub async fn shutdown(mut self) -> ShutdownReport {
        info!("shutting down gracefully...");
        self.state_tx.send_replace(LifecycleState::ShuttingDown);

        let mut report = ShutdownReport::default();

        if let Err(err) = self.backend.close() {
            error!("failed to close watch backend: {err}");
            report.backend_close_failed = true;
        }

        if let Err(err) = self.watcher.await {
            error!("event watcher task failed: {err}");
        }

        if let Some(DebouncerHandle { stop_tx, join }) = self.debouncer.take() {
            // The debouncer also stops if the sender is dropped, so a failed
            // send only means it already exited.
            let _ = stop_tx.send(());
            match join.await {
                Ok(stats) => report.debounce = Some(stats),
                Err(err) => error!("reload debouncer task failed: {err}"),
            }
        }

        self.state_tx.send_replace(LifecycleState::Stopped);
        debug!(?report, "shutdown complete");
        report
    }
}
