// src/engine/core.rs

//! Pure core of the watch loop.
//!
//! `CoreLoop` consumes [`WatchEvent`]s (plus the time they were observed) and
//! produces the [`LoopAction`]s the IO shell should perform. It owns the
//! debounce ledger and the choice of supervised entry point, and it asks the
//! classifier questions, but it never spawns processes or writes output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classify::FileClassifier;
use crate::engine::event_handlers::{handle_file_change, plan_startup};
use crate::engine::{CoreStep, LoopAction, WatchEvent};
use crate::exec::{CommandSpec, CommandTemplate};
use crate::types::{OutputMode, RunMode};
use crate::watch::Debouncer;
use crate::watch::scan::ScanReport;

/// Fixed inputs of the core, decided at startup.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Absolute watch root.
    pub root: PathBuf,
    pub debounce_window: Duration,
    pub run_mode: RunMode,
    pub output_mode: OutputMode,
    /// How to run an entry point.
    pub runner: CommandTemplate,
    /// stdin source for the supervised program.
    pub input: Option<PathBuf>,
}

pub struct CoreLoop {
    pub(crate) settings: LoopSettings,
    pub(crate) debouncer: Debouncer,
    pub(crate) classifier: Arc<dyn FileClassifier>,
    /// Entry point currently chosen for supervision.
    pub(crate) supervised: Option<PathBuf>,
}

impl fmt::Debug for CoreLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreLoop")
            .field("settings", &self.settings)
            .field("supervised", &self.supervised)
            .field("debounce_window", &self.debouncer.window())
            .field("debounced_paths", &self.debouncer.len())
            .finish_non_exhaustive()
    }
}

impl CoreLoop {
    pub fn new(settings: LoopSettings, classifier: Arc<dyn FileClassifier>) -> Self {
        let debouncer = Debouncer::new(settings.debounce_window);
        Self {
            settings,
            debouncer,
            classifier,
            supervised: None,
        }
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// The entry point being supervised, if any.
    pub fn supervised(&self) -> Option<&Path> {
        self.supervised.as_deref()
    }

    /// Actions for the startup pass: format every scanned source, then
    /// start the first entry point.
    pub fn startup(&mut self, scan: &ScanReport) -> Vec<LoopAction> {
        plan_startup(self, scan)
    }

    /// Handle a single event observed at `now`.
    pub fn step(&mut self, event: WatchEvent, now: Instant) -> CoreStep {
        match event {
            WatchEvent::FileChanged { path, kind } => handle_file_change(self, path, kind, now),
            WatchEvent::ShutdownRequested | WatchEvent::NotificationsClosed => CoreStep::exit(),
        }
    }

    /// Command that runs `entry` with the configured runner.
    pub(crate) fn run_spec(&self, entry: &Path) -> CommandSpec {
        self.settings
            .runner
            .render(entry)
            .with_cwd(&self.settings.root)
            .with_stdin(self.settings.input.clone())
    }
}
