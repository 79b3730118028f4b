// src/exec/backend.rs

//! Side-effect seams used by the watch loop.
//!
//! The loop never spawns processes itself. It talks to:
//! - a [`Formatter`], which rewrites one source file in place;
//! - a [`ProcessControl`], which owns the supervised program.
//!
//! Production wires in [`CommandFormatter`](super::CommandFormatter) and
//! [`Supervisor`](super::Supervisor); tests provide recording fakes.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::command::CommandSpec;

/// Best-effort formatting of a single file.
pub trait Formatter: Send + Sync {
    /// Format `path` in place.
    ///
    /// Returns whether the tool reported success. Failures are logged by the
    /// implementation and must never be propagated to the caller.
    fn format<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

/// Lifecycle of the single supervised program.
///
/// Implementations guarantee at most one live child at any time, and that
/// concurrent calls are applied one after another.
pub trait ProcessControl: Send + Sync {
    /// Launch `spec` if nothing is running.
    fn start(&self, spec: CommandSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Stop the current child (if any), wait for its exit, then launch `spec`.
    fn restart(&self, spec: CommandSpec)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Kill the current child's process group and wait for it. No-op if idle.
    fn stop(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Final stop; every later `start`/`restart` is rejected.
    fn shutdown(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
