use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Process identifier of the monitored process.
pub type Pid = i32;

/// "At least one relevant change happened since the last reload."
///
/// Carries no payload: only the presence and count of requests matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadRequest;

/// Signals the reloader knows how to deliver to the monitored process.
///
/// `Probe` is the null signal used purely as an existence check at startup;
/// it is never a valid reload signal and cannot be selected from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    #[serde(skip)]
    Probe,
    Usr1,
    Usr2,
    Hup,
}

impl Default for Signal {
    fn default() -> Self {
        Signal::Usr1
    }
}

impl Signal {
    /// Raw signal number for `kill(2)`.
    #[cfg(unix)]
    pub fn as_raw(self) -> libc::c_int {
        match self {
            Signal::Probe => 0,
            Signal::Usr1 => libc::SIGUSR1,
            Signal::Usr2 => libc::SIGUSR2,
            Signal::Hup => libc::SIGHUP,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Probe => "0",
            Signal::Usr1 => "SIGUSR1",
            Signal::Usr2 => "SIGUSR2",
            Signal::Hup => "SIGHUP",
        };
        f.write_str(name)
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_start_matches("sig") {
            "usr1" => Ok(Signal::Usr1),
            "usr2" => Ok(Signal::Usr2),
            "hup" => Ok(Signal::Hup),
            other => Err(format!(
                "invalid reload signal: {other} (expected \"usr1\", \"usr2\" or \"hup\")"
            )),
        }
    }
}
