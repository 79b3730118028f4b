// src/config/validate.rs

use globset::Glob;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DevloopError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DevloopError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        normalize_extensions(&mut raw);
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Accept both `"go"` and `".go"`.
fn normalize_extensions(cfg: &mut RawConfigFile) {
    for ext in cfg.source.extensions.iter_mut() {
        *ext = ext.trim().trim_start_matches('.').to_string();
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_commands(cfg)?;
    validate_source(cfg)?;
    validate_excludes(cfg)?;
    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (section, cmd) in [("format", &cfg.format.cmd), ("run", &cfg.run.cmd)] {
        match cmd.first() {
            None => {
                return Err(DevloopError::ConfigError(format!(
                    "[{section}].cmd must not be empty"
                )));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(DevloopError::ConfigError(format!(
                    "[{section}].cmd has an empty program name"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_source(cfg: &RawConfigFile) -> Result<()> {
    if cfg.source.extensions.is_empty() {
        return Err(DevloopError::ConfigError(
            "[source].extensions must list at least one extension".to_string(),
        ));
    }
    if let Some(ext) = cfg.source.extensions.iter().find(|e| e.is_empty()) {
        return Err(DevloopError::ConfigError(format!(
            "[source].extensions contains an empty extension ({ext:?})"
        )));
    }

    for pattern in cfg.source.entry_point.iter() {
        Regex::new(pattern).map_err(|e| {
            DevloopError::ConfigError(format!(
                "[source].entry_point: invalid regex '{pattern}': {e}"
            ))
        })?;
    }
    Ok(())
}

fn validate_excludes(cfg: &RawConfigFile) -> Result<()> {
    for pattern in cfg.watch.exclude.iter() {
        Glob::new(pattern).map_err(|e| {
            DevloopError::ConfigError(format!(
                "[watch].exclude: invalid glob '{pattern}': {e}"
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_yields_go_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.watch.delay, 1);
        assert_eq!(cfg.source.extensions, vec!["go".to_string()]);
        assert_eq!(cfg.format.cmd[0], "gofmt");
        assert_eq!(cfg.run.cmd, vec!["go", "run", "{file}"]);
        assert!(cfg.run.input.is_none());
    }

    #[test]
    fn leading_dots_are_stripped_from_extensions() {
        let cfg = parse("[source]\nextensions = [\".rs\", \"toml\"]\n").unwrap();
        assert_eq!(cfg.source.extensions, vec!["rs".to_string(), "toml".to_string()]);
    }

    #[test]
    fn empty_run_command_is_rejected() {
        let err = parse("[run]\ncmd = []\n").unwrap_err();
        assert!(matches!(err, DevloopError::ConfigError(ref m) if m.contains("[run].cmd")));
    }

    #[test]
    fn bad_entry_point_regex_is_rejected() {
        let err = parse("[source]\nentry_point = [\"(unclosed\"]\n").unwrap_err();
        assert!(matches!(err, DevloopError::ConfigError(ref m) if m.contains("entry_point")));
    }

    #[test]
    fn bad_exclude_glob_is_rejected() {
        let err = parse("[watch]\nexclude = [\"a/[b\"]\n").unwrap_err();
        assert!(matches!(err, DevloopError::ConfigError(ref m) if m.contains("exclude")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[watch]\ndelya = 3\n").unwrap_err();
        assert!(matches!(err, DevloopError::TomlError(_)));
    }
}
