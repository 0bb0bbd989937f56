// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::CliArgs;
use crate::types::{Pid, Signal};

/// Configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// extensions = [".php", ".twig", ".yaml", ".yml"]
/// exclude_dirs = ["var", "vendor"]
/// skip_hidden = true
///
/// [reload]
/// tick = 5
/// signal = "usr1"
/// ```
///
/// All sections are optional and default to the values above.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub reload: ReloadSection,
}

/// `[watch]` section: which directories are watched and which writes count.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Suffixes a written file must end with to request a reload.
    ///
    /// Matched case-sensitively against the full path.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names excluded together with their whole subtree.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Also exclude every directory whose name starts with `.`.
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,
}

fn default_extensions() -> Vec<String> {
    [".php", ".twig", ".yaml", ".yml"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["var".to_string(), "vendor".to_string()]
}

fn default_skip_hidden() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            skip_hidden: default_skip_hidden(),
        }
    }
}

/// `[reload]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadSection {
    /// Debounce window in seconds. At most one reload signal per tick.
    #[serde(default = "default_tick")]
    pub tick: u64,

    /// Signal sent to the monitored process.
    #[serde(default)]
    pub signal: Signal,
}

fn default_tick() -> u64 {
    5
}

impl Default for ReloadSection {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            signal: Signal::default(),
        }
    }
}

/// Validated configuration file. Construct via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub reload: ReloadSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, reload: ReloadSection) -> Self {
        Self { watch, reload }
    }
}

/// Everything the reloader needs to start, after merging CLI flags over the
/// config file. Paths are not resolved yet; see [`super::validate_settings`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    /// `None` runs the reloader in log-only mode.
    pub pid: Option<Pid>,
    pub tick: Duration,
    pub signal: Signal,
    pub watch: WatchSection,
    pub verbose: bool,
}

impl Settings {
    pub fn from_sources(args: &CliArgs, cfg: ConfigFile) -> Self {
        let tick = args.tick.unwrap_or(cfg.reload.tick);
        Self {
            root: args.path.clone(),
            pid: args.pid,
            tick: Duration::from_secs(tick),
            signal: args.signal.unwrap_or(cfg.reload.signal),
            watch: cfg.watch,
            verbose: args.verbose,
        }
    }
}
