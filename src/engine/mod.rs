// src/engine/mod.rs

//! Orchestration engine for devloop.
//!
//! This module ties together:
//! - the debouncer
//! - the file classifier
//! - the formatter and the process supervisor
//!
//! and reacts to:
//! - filesystem change notifications
//! - shutdown signals
//! - the notification stream closing
//!
//! The pure decision logic lives in [`core`] (with the per-event handlers in
//! [`event_handlers`]); the async/IO shell is implemented in [`runtime`].

use std::path::PathBuf;

use notify::EventKind;
use notify::event::ModifyKind;

use crate::exec::CommandSpec;

/// What happened to a path, reduced to what the loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Written,
    Renamed,
    Removed,
    Metadata,
    Other,
}

impl ChangeKind {
    pub fn from_notify(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                ChangeKind::Written
            }
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Renamed,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Metadata,
            EventKind::Remove(_) => ChangeKind::Removed,
            _ => ChangeKind::Other,
        }
    }

    /// Only creations and content writes can trigger work.
    pub fn is_relevant(self) -> bool {
        matches!(self, ChangeKind::Created | ChangeKind::Written)
    }
}

/// Events flowing into the watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A path under the watch root changed.
    FileChanged { path: PathBuf, kind: ChangeKind },
    /// Ctrl-C / SIGTERM.
    ShutdownRequested,
    /// The OS notification stream ended.
    NotificationsClosed,
}

/// Side effects the core asks the shell to perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopAction {
    /// Report-only mode: print `rel` as a line on stdout.
    Report(String),
    /// Run the formatter on `path` and wait for it.
    Format { path: PathBuf, rel: String },
    /// Launch the entry point without waiting for it.
    Start { spec: CommandSpec, rel: String },
    /// Replace the running entry point without waiting for it.
    Restart { spec: CommandSpec, rel: String },
}

/// Result of feeding one event into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub actions: Vec<LoopAction>,
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            actions: Vec::new(),
            keep_running: true,
        }
    }

    pub fn exit() -> Self {
        Self {
            actions: Vec::new(),
            keep_running: false,
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::{CoreLoop, LoopSettings};
pub use runtime::WatchLoop;
