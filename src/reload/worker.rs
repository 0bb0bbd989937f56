// src/reload/worker.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::lifecycle::LifecycleState;
use crate::reload::debounce::{PendingReloads, TickOutcome};
use crate::signal::ProcessSignaller;
use crate::types::{Pid, ReloadRequest, Signal};

/// Static settings of the debouncer.
#[derive(Debug, Clone, Copy)]
pub struct DebounceOptions {
    pub pid: Pid,
    pub signal: Signal,
    /// Debounce window; first evaluation happens one full tick after start.
    pub tick: Duration,
}

/// Counters returned when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    pub requests: u64,
    pub reloads_sent: u64,
    pub reload_failures: u64,
    /// Pending requests dropped because shutdown had begun.
    pub discarded: u64,
}

/// Worker owning the pending-reload counter and the tick timer.
///
/// It stops only when `stop_rx` fires (or its sender is dropped). A closed
/// reload channel merely disables that branch: ticks keep being evaluated
/// until the coordinator stops the timer.
pub struct ReloadDebouncer {
    options: DebounceOptions,
    reload_rx: mpsc::Receiver<ReloadRequest>,
    stop_rx: oneshot::Receiver<()>,
    state_rx: watch::Receiver<LifecycleState>,
    signaller: Arc<dyn ProcessSignaller>,
}

impl std::fmt::Debug for ReloadDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadDebouncer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ReloadDebouncer {
    pub fn new(
        options: DebounceOptions,
        reload_rx: mpsc::Receiver<ReloadRequest>,
        stop_rx: oneshot::Receiver<()>,
        state_rx: watch::Receiver<LifecycleState>,
        signaller: Arc<dyn ProcessSignaller>,
    ) -> Self {
        Self {
            options,
            reload_rx,
            stop_rx,
            state_rx,
            signaller,
        }
    }

    pub fn spawn(self) -> JoinHandle<DebounceStats> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) -> DebounceStats {
        let period = self.options.tick;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut pending = PendingReloads::new();
        let mut stats = DebounceStats::default();
        let mut reload_open = true;

        debug!(tick = ?period, pid = self.options.pid, "reload debouncer started");

        loop {
            tokio::select! {
                biased;

                _ = &mut self.stop_rx => {
                    debug!("tick timer stopped");
                    break;
                }
                request = self.reload_rx.recv(), if reload_open => match request {
                    Some(ReloadRequest) => {
                        pending.record();
                        stats.requests += 1;
                    }
                    None => {
                        debug!("reload channel closed");
                        reload_open = false;
                    }
                },
                _ = ticker.tick() => {
                    if let TickOutcome::Reload { requests } = pending.on_tick() {
                        self.dispatch(requests, &mut stats);
                    }
                }
            }
        }

        stats.discarded += pending.pending();
        debug!(?stats, "reload debouncer finished");
        stats
    }

    fn dispatch(&self, requests: u64, stats: &mut DebounceStats) {
        if *self.state_rx.borrow() != LifecycleState::Running {
            debug!(requests, "shutting down; dropping pending reload");
            stats.discarded += requests;
            return;
        }

        debug!("reload requested (times: {requests})");

        let DebounceOptions { pid, signal, .. } = self.options;
        match self.signaller.send_signal(pid, signal) {
            Ok(()) => {
                info!(pid, %signal, "reload signal sent");
                stats.reloads_sent += 1;
            }
            Err(err) => {
                error!(pid, %signal, "failed to send reload signal: {err}");
                stats.reload_failures += 1;
            }
        }
    }
}
