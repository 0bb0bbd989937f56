#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};

use fs_reloader::config::{Settings, WatchSection};
use fs_reloader::errors::Result;
use fs_reloader::fs::FileSystem;
use fs_reloader::lifecycle::{LifecycleState, ShutdownReport};
use fs_reloader::types::{Pid, Signal};
use fs_reloader::watch::{BackendStreams, WatchSet};

pub use fs_reloader_test_utils::*;

pub const PID: Pid = 4242;

/// Settings with default watch rules and `SIGUSR1`.
pub fn settings(root: impl Into<PathBuf>, pid: Option<Pid>, tick: Duration) -> Settings {
    Settings {
        root: root.into(),
        pid,
        tick,
        signal: Signal::Usr1,
        watch: WatchSection::default(),
        verbose: false,
    }
}

/// A fully wired reloader running on fakes.
pub struct Harness {
    pub backend: FakeBackendHandle,
    pub signaller: RecordingSignaller,
    pub state: watch::Receiver<LifecycleState>,
    pub watch_set: WatchSet,
    terminate: Option<oneshot::Sender<()>>,
    done: Option<oneshot::Receiver<ShutdownReport>>,
}

impl Harness {
    /// Start the reloader on a fake backend through `fs_reloader::start`,
    /// indexing `root` on `fs`. Only `PID` is alive for the signaller.
    ///
    /// `pid = None` starts the log-only configuration.
    pub fn start(fs: &dyn FileSystem, root: &str, pid: Option<Pid>, tick: Duration) -> Self {
        Self::try_start_with(FakeBackend::new(), fs, &settings(root, pid, tick))
            .expect("reloader failed to start")
    }

    pub fn start_with(
        backend: (FakeBackend, BackendStreams, FakeBackendHandle),
        fs: &dyn FileSystem,
        root: &str,
        pid: Option<Pid>,
        tick: Duration,
    ) -> Self {
        Self::try_start_with(backend, fs, &settings(root, pid, tick))
            .expect("reloader failed to start")
    }

    pub fn try_start_with(
        (backend, streams, handle): (FakeBackend, BackendStreams, FakeBackendHandle),
        fs: &dyn FileSystem,
        settings: &Settings,
    ) -> Result<Self> {
        let signaller = RecordingSignaller::with_live([PID]);
        let (terminate_tx, terminate_rx) = oneshot::channel::<()>();

        let running = fs_reloader::start(
            settings,
            fs,
            (backend, streams),
            Arc::new(signaller.clone()),
            async move {
                let _ = terminate_rx.await;
            },
        )?;

        Ok(Self {
            backend: handle,
            signaller,
            state: running.state,
            watch_set: running.watch_set,
            terminate: Some(terminate_tx),
            done: Some(running.done),
        })
    }

    pub fn watches(&self, dir: &str) -> bool {
        self.watch_set.contains(Path::new(dir))
    }

    /// Deliver the termination request and wait for the completion signal.
    pub async fn terminate(&mut self) -> ShutdownReport {
        if let Some(tx) = self.terminate.take() {
            let _ = tx.send(());
        }
        let done = self.done.take().expect("terminate called twice");
        with_timeout(done)
            .await
            .expect("coordinator dropped completion signal")
    }
}
