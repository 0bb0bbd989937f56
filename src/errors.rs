// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Everything in here is a startup-path failure: the reloader refuses to
//! enter its running state. Runtime failures inside the workers are logged
//! where they happen and never travel through this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Pid;

#[derive(Error, Debug)]
pub enum ReloaderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("folder does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("file: {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid process id {0}: must be a positive integer")]
    InvalidPid(Pid),

    #[error("process id {pid} does not exist: {source}")]
    ProcessNotFound {
        pid: Pid,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to index {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to watch directory {}: {source}", path.display())]
    Registration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("watch backend error: {0}")]
    Backend(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReloaderError>;
