// src/reload/debounce.rs

//! Pure pending-reload counter.
//!
//! No Tokio, no clocks, no signals: the worker in [`super::worker`] feeds it
//! request arrivals and tick firings and acts on what comes back.

/// What a tick firing asks the worker to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed since the previous tick.
    Idle,
    /// Send one reload signal; `requests` were coalesced into it.
    Reload { requests: u64 },
}

#[derive(Debug, Default)]
pub struct PendingReloads {
    count: u64,
}

impl PendingReloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn pending(&self) -> u64 {
        self.count
    }

    /// Evaluate the counter at a tick boundary.
    ///
    /// The counter is reset here, before the signal is attempted, so a
    /// failed delivery is never retried on the next tick.
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.count < 1 {
            return TickOutcome::Idle;
        }
        let requests = std::mem::take(&mut self.count);
        TickOutcome::Reload { requests }
    }
}
