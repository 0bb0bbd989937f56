// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile, ReloadSection, Settings, WatchSection};
use crate::errors::{ReloaderError, Result};
use crate::fs::FileSystem;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ReloaderError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_watch_section(&raw.watch)?;
        validate_reload_section(&raw.reload)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.reload))
    }
}

fn validate_watch_section(watch: &WatchSection) -> Result<()> {
    if watch.extensions.is_empty() {
        return Err(ReloaderError::ConfigError(
            "[watch].extensions must list at least one suffix".to_string(),
        ));
    }
    if watch.extensions.iter().any(|ext| ext.is_empty()) {
        return Err(ReloaderError::ConfigError(
            "[watch].extensions must not contain empty suffixes".to_string(),
        ));
    }
    if watch.exclude_dirs.iter().any(|name| name.is_empty()) {
        return Err(ReloaderError::ConfigError(
            "[watch].exclude_dirs must not contain empty names".to_string(),
        ));
    }
    Ok(())
}

/// Longest accepted debounce window: one day.
pub const MAX_TICK_SECS: u64 = 24 * 60 * 60;

fn check_tick(secs: u64, origin: &str) -> Result<()> {
    if secs == 0 || secs > MAX_TICK_SECS {
        return Err(ReloaderError::ConfigError(format!(
            "{origin} must be between 1 and {MAX_TICK_SECS} seconds (got {secs})"
        )));
    }
    Ok(())
}

fn validate_reload_section(reload: &ReloadSection) -> Result<()> {
    check_tick(reload.tick, "[reload].tick")
}

/// Resolve `settings.root` to an absolute directory and re-check the merged
/// tick (the CLI may override the file with an out-of-range value).
pub fn validate_settings(mut settings: Settings, fs: &dyn FileSystem) -> Result<Settings> {
    check_tick(settings.tick.as_secs(), "--tick")?;
    settings.root = resolve_root(fs, &settings.root)?;
    Ok(settings)
}

/// Turn the user-supplied watch path into an absolute path and make sure it
/// is an existing directory.
///
/// An empty path means the current directory. `.` and `..` components are
/// resolved lexically, so the result never ends in either.
pub fn resolve_root(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    let abs = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&std::path::absolute(path)?)
    };

    if !fs.exists(&abs) {
        return Err(ReloaderError::RootNotFound(abs));
    }
    if !fs.is_dir(&abs) {
        return Err(ReloaderError::NotADirectory(abs));
    }
    Ok(abs)
}

/// Drop `.` components and let `..` remove the preceding one. `..` at the
/// filesystem root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
