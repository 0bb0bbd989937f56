// src/signal/mod.rs

//! Process-signal delivery.
//!
//! The debouncer talks to a [`ProcessSignaller`] rather than calling
//! `kill(2)` directly, so tests can record signals instead of sending them.

use std::io;

use tracing::debug;

use crate::errors::{ReloaderError, Result};
use crate::types::{Pid, Signal};

/// Trait abstracting how a signal reaches another process.
pub trait ProcessSignaller: Send + Sync {
    fn send_signal(&self, pid: Pid, signal: Signal) -> io::Result<()>;
}

/// Real signaller used in production (`kill(2)` on unix).
#[derive(Debug, Clone, Copy, Default)]
pub struct LibcSignaller;

impl ProcessSignaller for LibcSignaller {
    #[cfg(unix)]
    fn send_signal(&self, pid: Pid, signal: Signal) -> io::Result<()> {
        // SAFETY: kill(2) takes plain integers and touches no memory of ours.
        let rc = unsafe { libc::kill(pid, signal.as_raw()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn send_signal(&self, _pid: Pid, signal: Signal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot deliver {signal} on this platform"),
        ))
    }
}

/// Check once, at startup, that `pid` names a process we can signal.
///
/// Uses the null signal, which performs the permission and existence checks
/// without delivering anything.
pub fn probe_process(signaller: &dyn ProcessSignaller, pid: Pid) -> Result<()> {
    if pid <= 0 {
        return Err(ReloaderError::InvalidPid(pid));
    }
    signaller
        .send_signal(pid, Signal::Probe)
        .map_err(|source| ReloaderError::ProcessNotFound { pid, source })?;
    debug!(pid, "monitored process exists");
    Ok(())
}
