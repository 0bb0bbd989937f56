use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use fs_reloader::signal::ProcessSignaller;
use fs_reloader::types::{Pid, Signal};

/// A signal the fake "delivered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentSignal {
    pub pid: Pid,
    pub signal: Signal,
    /// Tokio clock, so paused-time tests can assert on tick boundaries.
    pub at: Instant,
}

/// Signaller that records instead of calling `kill(2)`.
///
/// Only pids passed to [`RecordingSignaller::with_live`] exist; signalling
/// anything else fails with `ESRCH`-like `NotFound`. Failed attempts are
/// recorded too.
#[derive(Debug, Clone, Default)]
pub struct RecordingSignaller {
    live: Arc<Mutex<HashSet<Pid>>>,
    sent: Arc<Mutex<Vec<SentSignal>>>,
    failed: Arc<Mutex<Vec<SentSignal>>>,
}

impl RecordingSignaller {
    pub fn with_live(pids: impl IntoIterator<Item = Pid>) -> Self {
        let s = Self::default();
        s.live.lock().unwrap().extend(pids);
        s
    }

    /// Simulate the monitored process exiting.
    pub fn kill(&self, pid: Pid) {
        self.live.lock().unwrap().remove(&pid);
    }

    /// Successfully delivered signals, excluding liveness probes.
    pub fn reloads(&self) -> Vec<SentSignal> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.signal != Signal::Probe)
            .copied()
            .collect()
    }

    pub fn probes(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.signal == Signal::Probe)
            .count()
    }

    pub fn failures(&self) -> Vec<SentSignal> {
        self.failed.lock().unwrap().clone()
    }
}

impl ProcessSignaller for RecordingSignaller {
    fn send_signal(&self, pid: Pid, signal: Signal) -> io::Result<()> {
        let record = SentSignal {
            pid,
            signal,
            at: Instant::now(),
        };
        if self.live.lock().unwrap().contains(&pid) {
            self.sent.lock().unwrap().push(record);
            Ok(())
        } else {
            self.failed.lock().unwrap().push(record);
            Err(io::Error::new(io::ErrorKind::NotFound, "no such process"))
        }
    }
}
