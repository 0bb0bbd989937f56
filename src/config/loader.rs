// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// With `None` the built-in defaults are used, so running without a config
/// file behaves exactly like an empty one.
pub fn load_and_validate(path: Option<&Path>) -> Result<ConfigFile> {
    let raw_config = match path {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}
