// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevloopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("cannot resolve watch path {path:?}: {source}")]
    WatchPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot subscribe to filesystem notifications: {0}")]
    Subscribe(#[from] notify::Error),

    #[error("failed to launch `{cmd}`: {source}")]
    Launch {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot start `{cmd}`: supervisor is {state}")]
    AlreadyRunning { cmd: String, state: String },

    #[error("supervisor is shutting down")]
    ShuttingDown,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DevloopError>;
