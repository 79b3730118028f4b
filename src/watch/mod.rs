// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up the OS filesystem watcher (`notify`) and turning its events
//!   into [`WatchEvent`](crate::engine::WatchEvent)s.
//! - Per-path debouncing of those events.
//! - The startup scan that pre-formats sources and finds entry points.
//!
//! It does **not** decide what to do with a change; that is the engine's job.

pub mod debounce;
pub mod path_utils;
pub mod scan;
pub mod watcher;

pub use debounce::Debouncer;
pub use scan::{ScanReport, scan_tree};
pub use watcher::{WatcherHandle, spawn_watcher};
