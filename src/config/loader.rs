// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Name of the config file looked up in the watch root.
pub const DEFAULT_CONFIG_FILE: &str = "Devloop.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Pick the config to use for a watch root.
///
/// - An explicit `--config` path must exist and parse.
/// - Otherwise `Devloop.toml` in `root` is used when present.
/// - Otherwise the built-in defaults apply.
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        debug!(?path, "loading explicit config file");
        return load_and_validate(path);
    }

    let candidate = default_config_path(root);
    if candidate.is_file() {
        debug!(path = ?candidate, "loading config file from watch root");
        return load_and_validate(&candidate);
    }

    debug!("no config file found; using built-in defaults");
    Ok(ConfigFile::default())
}

/// `Devloop.toml` inside the given root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}

/// Apply `-d` and `-i` on top of the file configuration.
///
/// `-i` is relative to the current directory, unlike `[run].input`, so it is
/// made absolute here. `-n` is not part of the file config; it becomes the
/// `RunMode`.
pub fn apply_cli_overrides(cfg: &mut ConfigFile, args: &CliArgs) {
    if let Some(delay) = args.delay {
        cfg.watch.delay = delay;
    }
    if let Some(ref input) = args.input {
        let input = std::path::absolute(input).unwrap_or_else(|_| input.clone());
        cfg.run.input = Some(input);
    }
}
