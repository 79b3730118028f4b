#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use devloop::classify::FileClassifier;
use devloop::config::{ConfigFile, RawConfigFile};
use devloop::engine::{CoreLoop, LoopSettings};
use devloop::exec::CommandTemplate;
use devloop::types::{OutputMode, RunMode};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn delay(mut self, secs: u64) -> Self {
        self.config.watch.delay = secs;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.source.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn entry_point(mut self, patterns: &[&str]) -> Self {
        self.config.source.entry_point = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn format_cmd(mut self, argv: &[&str]) -> Self {
        self.config.format.cmd = argv.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn run_cmd(mut self, argv: &[&str]) -> Self {
        self.config.run.cmd = argv.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.run.input = Some(path.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `CoreLoop` rooted at `root`.
///
/// Defaults: 1s window, run enabled, interactive output, `go run {file}`.
pub struct CoreLoopBuilder {
    settings: LoopSettings,
}

impl CoreLoopBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            settings: LoopSettings {
                root: root.into(),
                debounce_window: Duration::from_secs(1),
                run_mode: RunMode::FormatAndRun,
                output_mode: OutputMode::Interactive,
                runner: CommandTemplate::new(vec![
                    "go".to_string(),
                    "run".to_string(),
                    "{file}".to_string(),
                ]),
                input: None,
            },
        }
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.settings.debounce_window = window;
        self
    }

    pub fn run_mode(mut self, mode: RunMode) -> Self {
        self.settings.run_mode = mode;
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.settings.output_mode = mode;
        self
    }

    pub fn runner(mut self, argv: &[&str]) -> Self {
        self.settings.runner = CommandTemplate::new(argv.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn build(self, classifier: impl FileClassifier + 'static) -> CoreLoop {
        CoreLoop::new(self.settings, Arc::new(classifier))
    }
}
