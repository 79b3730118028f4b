// src/lib.rs

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::classify::ToolchainClassifier;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, apply_cli_overrides, resolve_config};
use crate::engine::{CoreLoop, LoopSettings, WatchEvent, WatchLoop};
use crate::errors::{DevloopError, Result};
use crate::exec::{CommandFormatter, CommandTemplate, Supervisor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{OutputMode, RunMode};
use crate::watch::{scan_tree, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - watch root + config resolution
/// - the file watcher (fatal if it cannot be set up)
/// - Ctrl-C / SIGTERM handling
/// - the startup scan
/// - the watch loop with the real formatter and supervisor
pub async fn run(args: CliArgs) -> Result<()> {
    let root = resolve_watch_root(&args.path)?;
    let mut cfg = resolve_config(&root, args.config.as_deref())?;
    apply_cli_overrides(&mut cfg, &args);

    let run_mode = RunMode::from_no_run(args.no_run);
    let output_mode = OutputMode::detect();
    debug!(?run_mode, ?output_mode, delay = cfg.watch.delay, "resolved settings");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let classifier = Arc::new(ToolchainClassifier::from_config(&cfg, &root, Arc::clone(&fs))?);

    let (tx, rx) = mpsc::channel::<WatchEvent>(64);

    // Subscribe before scanning so nothing written during the scan is lost.
    let _watcher = spawn_watcher(&root, tx.clone())?;
    spawn_signal_listener(tx);

    let scan = {
        let fs = Arc::clone(&fs);
        let classifier = Arc::clone(&classifier);
        let root = root.clone();
        tokio::task::spawn_blocking(move || scan_tree(fs.as_ref(), &root, classifier.as_ref()))
            .await
            .map_err(|e| DevloopError::Other(e.into()))?
    };

    let settings = LoopSettings {
        root: root.clone(),
        debounce_window: cfg.debounce_window(),
        run_mode,
        output_mode,
        runner: CommandTemplate::new(cfg.run.cmd.clone()),
        input: resolve_input(&root, &cfg),
    };
    let core = CoreLoop::new(settings, classifier);

    let formatter = Arc::new(CommandFormatter::new(
        CommandTemplate::new(cfg.format.cmd.clone()),
        &root,
    ));
    let supervisor = Arc::new(Supervisor::new());

    WatchLoop::new(core, rx, formatter, supervisor, Box::new(std::io::stdout()))
        .run(scan)
        .await
}

/// Absolute, symlink-free watch root. Fatal if missing or not a directory.
pub fn resolve_watch_root(path: &Path) -> Result<PathBuf> {
    let root = path.canonicalize().map_err(|source| DevloopError::WatchPath {
        path: path.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(DevloopError::WatchPath {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }
    Ok(root)
}

/// `[run].input`, with relative paths taken from the watch root.
fn resolve_input(root: &Path, cfg: &ConfigFile) -> Option<PathBuf> {
    cfg.run.input.as_ref().map(|input| {
        if input.is_relative() {
            root.join(input)
        } else {
            input.clone()
        }
    })
}

/// Ctrl-C (and SIGTERM on unix) → `ShutdownRequested`.
fn spawn_signal_listener(tx: mpsc::Sender<WatchEvent>) {
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            warn!(error = %e, "failed to listen for shutdown signals");
            return;
        }
        info!("shutdown signal received");
        let _ = tx.send(WatchEvent::ShutdownRequested).await;
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = term.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
