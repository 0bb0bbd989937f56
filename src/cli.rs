// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{Pid, Signal};

/// Command-line arguments for `fs-reloader`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fs-reloader",
    version,
    about = "Watch a source tree and signal a worker process to reload on changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Filesystem path to watch for file changes.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Pid of the process to monitor and send the reload signal to.
    ///
    /// Without it the reloader only logs relevant changes.
    #[arg(long, value_name = "PID", allow_negative_numbers = true)]
    pub pid: Option<Pid>,

    /// Minimum duration between reloads, in seconds.
    ///
    /// Overrides `[reload] tick` from the config file (default: 5).
    #[arg(long, value_name = "SECONDS")]
    pub tick: Option<u64>,

    /// Reload signal: usr1, usr2 or hup (a `SIG` prefix is accepted).
    ///
    /// Overrides `[reload] signal` from the config file (default: usr1).
    #[arg(long, value_name = "SIGNAL")]
    pub signal: Option<Signal>,

    /// Log verbose output (every raw event, skipped and watched dirs).
    #[arg(long)]
    pub verbose: bool,

    /// Optional TOML file with watch/reload settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FS_RELOADER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_flags() {
        let args = CliArgs::parse_from(["fs-reloader"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(args.pid, None);
        assert_eq!(args.tick, None);
        assert_eq!(args.signal, None);
        assert!(!args.verbose);
        assert!(args.config.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::parse_from([
            "fs-reloader",
            "--path",
            "/srv/app",
            "--pid",
            "4242",
            "--tick",
            "2",
            "--signal",
            "SIGHUP",
            "--verbose",
            "--log-level",
            "trace",
        ]);
        assert_eq!(args.path, PathBuf::from("/srv/app"));
        assert_eq!(args.pid, Some(4242));
        assert_eq!(args.tick, Some(2));
        assert_eq!(args.signal, Some(Signal::Hup));
        assert!(args.verbose);
        assert!(matches!(args.log_level, Some(LogLevel::Trace)));
    }

    #[test]
    fn unknown_signal_is_rejected_by_the_parser() {
        let err = CliArgs::try_parse_from(["fs-reloader", "--signal", "term"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn negative_pid_reaches_validation() {
        let args = CliArgs::parse_from(["fs-reloader", "--pid", "-1"]);
        assert_eq!(args.pid, Some(-1));
    }
}
