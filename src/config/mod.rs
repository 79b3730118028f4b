// src/config/mod.rs

//! Configuration loading and validation for devloop.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate commands, regexes and globs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    DEFAULT_CONFIG_FILE, apply_cli_overrides, load_and_validate, load_from_path, resolve_config,
};
pub use model::{ConfigFile, FormatSection, RawConfigFile, RunSection, SourceSection, WatchSection};
