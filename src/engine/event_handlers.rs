// src/engine/event_handlers.rs

//! Per-event decision logic for [`CoreLoop`].

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::engine::core::CoreLoop;
use crate::engine::{ChangeKind, CoreStep, LoopAction};
use crate::watch::path_utils::{display_path, relative_str};
use crate::watch::scan::ScanReport;

/// Startup pass.
///
/// - Report-only mode does nothing: downstream tools do their own work.
/// - Every scanned source is formatted, in scan order.
/// - If running is allowed, the first entry point is supervised and the
///   others are only reported.
pub(crate) fn plan_startup(core: &mut CoreLoop, scan: &ScanReport) -> Vec<LoopAction> {
    let root = core.settings.root.clone();

    if core.settings.output_mode.is_report_only() {
        info!("stdout is a pipe; reporting changed paths only");
        return Vec::new();
    }

    let mut actions: Vec<LoopAction> = scan
        .sources
        .iter()
        .map(|path| LoopAction::Format {
            path: path.clone(),
            rel: display_path(&root, path),
        })
        .collect();

    for (idx, entry) in scan.entry_points.iter().enumerate() {
        let rel = display_path(&root, entry);
        if idx == 0 {
            info!(path = %rel, "main file");
        } else {
            info!(path = %rel, "main file (not supervised; only the first one runs)");
        }
    }

    if !core.settings.run_mode.allows_running() {
        debug!("run disabled; not starting any entry point");
        return actions;
    }

    if let Some(entry) = scan.primary_entry_point() {
        let entry = entry.to_path_buf();
        let spec = core.run_spec(&entry);
        actions.push(LoopAction::Start {
            spec,
            rel: display_path(&root, &entry),
        });
        core.supervised = Some(entry);
    }

    actions
}

/// A single filesystem notification.
///
/// Order of checks: operation kind → debounce → report-only → relevance →
/// format → (maybe) restart.
pub(crate) fn handle_file_change(
    core: &mut CoreLoop,
    path: PathBuf,
    kind: ChangeKind,
    now: Instant,
) -> CoreStep {
    if !kind.is_relevant() {
        trace!(?path, ?kind, "ignoring non-content event");
        return CoreStep::idle();
    }

    if !core.debouncer.accept(&path, now) {
        return CoreStep::idle();
    }

    let Some(rel) = relative_str(&core.settings.root, &path) else {
        warn!(?path, root = ?core.settings.root, "event outside watch root");
        return CoreStep::idle();
    };

    if core.settings.output_mode.is_report_only() {
        return CoreStep {
            actions: vec![LoopAction::Report(rel)],
            keep_running: true,
        };
    }

    if !core.classifier.is_relevant_source_file(&path) {
        trace!(path = %rel, "not a relevant source file");
        return CoreStep::idle();
    }

    info!(path = %rel, ?kind, "changed");
    let mut actions = vec![LoopAction::Format {
        path: path.clone(),
        rel: rel.clone(),
    }];

    if core.settings.run_mode.allows_running() {
        let is_supervised = match core.supervised.as_deref() {
            Some(entry) => entry == path.as_path(),
            None if core.classifier.is_entry_point(&path) => {
                info!(path = %rel, "new main file; supervising it");
                core.supervised = Some(path.clone());
                true
            }
            None => false,
        };

        if is_supervised {
            actions.push(LoopAction::Restart {
                spec: core.run_spec(&path),
                rel,
            });
        }
    }

    CoreStep {
        actions,
        keep_running: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::classify::ToolchainClassifier;
    use crate::config::ConfigFile;
    use crate::engine::WatchEvent;
    use crate::engine::core::LoopSettings;
    use crate::exec::CommandTemplate;
    use crate::fs::mock::MockFileSystem;
    use crate::types::{OutputMode, RunMode};

    const MAIN_GO: &str = "package main\n\nfunc main() {}\n";

    fn core_with(fs: &MockFileSystem, run_mode: RunMode, output_mode: OutputMode) -> CoreLoop {
        let cfg = ConfigFile::default();
        let classifier =
            ToolchainClassifier::from_config(&cfg, "/repo", Arc::new(fs.clone())).unwrap();
        let settings = LoopSettings {
            root: PathBuf::from("/repo"),
            debounce_window: Duration::from_secs(1),
            run_mode,
            output_mode,
            runner: CommandTemplate::new(cfg.run.cmd.clone()),
            input: None,
        };
        CoreLoop::new(settings, Arc::new(classifier))
    }

    fn written(path: &str) -> WatchEvent {
        WatchEvent::FileChanged {
            path: PathBuf::from(path),
            kind: ChangeKind::Written,
        }
    }

    fn startup_scan(fs: &MockFileSystem, core: &CoreLoop) -> ScanReport {
        crate::watch::scan_tree(fs, Path::new("/repo"), core.classifier.as_ref())
    }

    #[test]
    fn startup_formats_everything_and_starts_first_entry_point() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/a/main.go", MAIN_GO);
        fs.add_file("/repo/b/main.go", MAIN_GO);
        fs.add_file("/repo/lib.go", "package lib\n");
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);

        let scan = startup_scan(&fs, &core);
        let actions = core.startup(&scan);

        let formats = actions
            .iter()
            .filter(|a| matches!(a, LoopAction::Format { .. }))
            .count();
        assert_eq!(formats, 3);

        let starts: Vec<&LoopAction> = actions
            .iter()
            .filter(|a| matches!(a, LoopAction::Start { .. }))
            .collect();
        assert_eq!(starts.len(), 1);
        match starts[0] {
            LoopAction::Start { spec, rel } => {
                assert_eq!(rel, "a/main.go");
                assert_eq!(spec.args, vec!["run", "/repo/a/main.go"]);
                assert_eq!(spec.cwd.as_deref(), Some(Path::new("/repo")));
            }
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(core.supervised(), Some(Path::new("/repo/a/main.go")));
    }

    #[test]
    fn startup_in_report_only_mode_does_nothing() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::ReportOnly);
        let scan = startup_scan(&fs, &core);
        assert!(core.startup(&scan).is_empty());
        assert_eq!(core.supervised(), None);
    }

    #[test]
    fn write_to_supervised_entry_point_formats_then_restarts() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        let scan = startup_scan(&fs, &core);
        core.startup(&scan);

        let step = core.step(written("/repo/app.go"), Instant::now());
        assert!(step.keep_running);
        assert!(matches!(step.actions[0], LoopAction::Format { ref rel, .. } if rel == "app.go"));
        assert!(matches!(step.actions[1], LoopAction::Restart { ref rel, .. } if rel == "app.go"));
        assert_eq!(step.actions.len(), 2);
    }

    #[test]
    fn write_to_other_source_only_formats() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        fs.add_file("/repo/util.go", "package main\n\nfunc util() {}\n");
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        let scan = startup_scan(&fs, &core);
        core.startup(&scan);

        let step = core.step(written("/repo/util.go"), Instant::now());
        assert_eq!(step.actions.len(), 1);
        assert!(matches!(step.actions[0], LoopAction::Format { .. }));
    }

    #[test]
    fn first_entry_point_seen_after_startup_is_adopted() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        core.startup(&ScanReport::default());
        assert_eq!(core.supervised(), None);

        fs.add_file("/repo/app.go", MAIN_GO);
        let step = core.step(
            WatchEvent::FileChanged {
                path: PathBuf::from("/repo/app.go"),
                kind: ChangeKind::Created,
            },
            Instant::now(),
        );
        assert!(matches!(step.actions.last(), Some(LoopAction::Restart { .. })));
        assert_eq!(core.supervised(), Some(Path::new("/repo/app.go")));

        // A second main file does not steal supervision.
        fs.add_file("/repo/other.go", MAIN_GO);
        let step = core.step(written("/repo/other.go"), Instant::now());
        assert_eq!(step.actions.len(), 1);
    }

    #[test]
    fn irrelevant_kinds_and_files_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        fs.add_file("/repo/README.md", "# hi");
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        let now = Instant::now();

        for kind in [ChangeKind::Removed, ChangeKind::Renamed, ChangeKind::Metadata, ChangeKind::Other] {
            let step = core.step(
                WatchEvent::FileChanged {
                    path: PathBuf::from("/repo/app.go"),
                    kind,
                },
                now,
            );
            assert!(step.actions.is_empty(), "{kind:?}");
        }
        // Ignored kinds do not consume the debounce slot.
        assert!(!core.step(written("/repo/app.go"), now).actions.is_empty());

        assert!(core.step(written("/repo/README.md"), now).actions.is_empty());
    }

    #[test]
    fn format_only_never_restarts() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        let mut core = core_with(&fs, RunMode::FormatOnly, OutputMode::Interactive);
        let scan = startup_scan(&fs, &core);
        let startup = core.startup(&scan);
        assert!(startup.iter().all(|a| matches!(a, LoopAction::Format { .. })));

        let step = core.step(written("/repo/app.go"), Instant::now());
        assert_eq!(step.actions.len(), 1);
        assert!(matches!(step.actions[0], LoopAction::Format { .. }));
    }

    #[test]
    fn report_only_emits_relative_path() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/pkg/x.go", "package pkg\n");
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::ReportOnly);

        let step = core.step(written("/repo/pkg/x.go"), Instant::now());
        assert_eq!(step.actions, vec![LoopAction::Report("pkg/x.go".to_string())]);
    }

    #[test]
    fn second_write_inside_window_is_dropped() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        let scan = startup_scan(&fs, &core);
        core.startup(&scan);

        let t0 = Instant::now();
        assert_eq!(core.step(written("/repo/app.go"), t0).actions.len(), 2);
        assert!(
            core.step(written("/repo/app.go"), t0 + Duration::from_millis(200))
                .actions
                .is_empty()
        );
        assert_eq!(
            core.step(written("/repo/app.go"), t0 + Duration::from_millis(1200))
                .actions
                .len(),
            2
        );
    }

    #[test]
    fn shutdown_and_closed_stream_stop_the_loop() {
        let fs = MockFileSystem::new();
        let mut core = core_with(&fs, RunMode::FormatAndRun, OutputMode::Interactive);
        assert!(!core.step(WatchEvent::ShutdownRequested, Instant::now()).keep_running);
        assert!(!core.step(WatchEvent::NotificationsClosed, Instant::now()).keep_running);
    }
}
