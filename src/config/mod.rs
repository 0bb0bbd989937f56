// src/config/mod.rs

//! Configuration: optional TOML file, CLI overlay and startup validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, RawConfigFile, ReloadSection, Settings, WatchSection};
pub use validate::{resolve_root, validate_settings};
