// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Raw configuration as read from `Devloop.toml`.
///
/// ```toml
/// [watch]
/// delay = 1
/// exclude = ["vendor/**"]
///
/// [source]
/// extensions = ["go"]
/// entry_point = ['(?m)^package\s+main\b', '(?m)^func\s+main\s*\(\s*\)']
///
/// [format]
/// cmd = ["gofmt", "-w", "{file}"]
///
/// [run]
/// cmd = ["go", "run", "{file}"]
/// input = "fixtures/stdin.txt"
/// ```
///
/// All sections are optional; a missing file is equivalent to an empty one.
/// Use `ConfigFile::try_from` to validate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub format: FormatSection,

    #[serde(default)]
    pub run: RunSection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can assume commands are non-empty and all patterns compile.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub source: SourceSection,
    pub format: FormatSection,
    pub run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            watch: raw.watch,
            source: raw.source,
            format: raw.format,
            run: raw.run,
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.watch.delay)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Debounce window in whole seconds.
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Globs (relative to the watch root) that are never scanned, formatted
    /// or run.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_delay() -> u64 {
    1
}

fn default_exclude() -> Vec<String> {
    vec!["vendor/**".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            exclude: default_exclude(),
        }
    }
}

/// `[source]` section: what counts as a source file and as an entry point.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    /// File extensions without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Regexes that must *all* match a file's contents for it to be an entry
    /// point.
    #[serde(default = "default_entry_point")]
    pub entry_point: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

fn default_entry_point() -> Vec<String> {
    vec![
        r"(?m)^package\s+main\b".to_string(),
        r"(?m)^func\s+main\s*\(\s*\)".to_string(),
    ]
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            entry_point: default_entry_point(),
        }
    }
}

/// `[format]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    /// Formatter argv; `{file}` is replaced with the absolute path.
    #[serde(default = "default_format_cmd")]
    pub cmd: Vec<String>,
}

fn default_format_cmd() -> Vec<String> {
    vec!["gofmt".to_string(), "-w".to_string(), "{file}".to_string()]
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            cmd: default_format_cmd(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Runner argv; `{file}` is replaced with the entry point's path.
    #[serde(default = "default_run_cmd")]
    pub cmd: Vec<String>,

    /// File fed to the program's stdin. Relative paths resolve against the
    /// watch root.
    #[serde(default)]
    pub input: Option<PathBuf>,
}

fn default_run_cmd() -> Vec<String> {
    vec!["go".to_string(), "run".to_string(), "{file}".to_string()]
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cmd: default_run_cmd(),
            input: None,
        }
    }
}
