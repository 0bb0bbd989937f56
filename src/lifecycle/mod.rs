// src/lifecycle/mod.rs

//! Process-level lifecycle: `Starting → Running → ShuttingDown → Stopped`.
//!
//! The current state is published on a `tokio::sync::watch` channel. Only
//! the coordinator writes it; workers read it.

use std::io;

use tokio::sync::watch;
use tracing::info;

pub mod coordinator;

pub use coordinator::{Coordinator, ShutdownReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Indexing and registering watches. Fatal errors abort here.
    Starting,
    /// Workers are running and reloads may be signalled.
    Running,
    /// Termination requested; no further reload signals are sent.
    ShuttingDown,
    /// Terminal.
    Stopped,
}

/// Create the state channel in `Starting`.
pub fn state_channel() -> (watch::Sender<LifecycleState>, watch::Receiver<LifecycleState>) {
    watch::channel(LifecycleState::Starting)
}

/// Which of the two termination requests arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

/// SIGINT/SIGTERM listener, installed during startup so that a request
/// arriving before the coordinator runs is not lost.
#[derive(Debug)]
pub struct TerminationListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl TerminationListener {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first termination request.
    #[cfg(unix)]
    pub async fn wait(mut self) -> TerminationSignal {
        let received = tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        };
        info!(signal = ?received, "termination requested");
        received
    }

    #[cfg(not(unix))]
    pub async fn wait(self) -> TerminationSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("termination requested");
        TerminationSignal::Interrupt
    }
}
