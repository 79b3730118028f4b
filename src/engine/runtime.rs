// src/engine/runtime.rs

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::errors::{DevloopError, Result};
use crate::exec::{Formatter, ProcessControl};
use crate::watch::scan::ScanReport;

use super::core::CoreLoop;
use super::{LoopAction, WatchEvent};

/// Drives [`CoreLoop`] from a channel of [`WatchEvent`]s and performs the
/// resulting actions.
///
/// - Formatting is awaited inline, so a restart always sees the formatted
///   file.
/// - Starts and restarts are dispatched as tasks; the loop never waits on
///   the supervised program. The supervisor serializes them.
/// - On exit the supervisor is shut down before `run` returns, so no child
///   process group outlives the loop.
pub struct WatchLoop {
    core: CoreLoop,
    event_rx: mpsc::Receiver<WatchEvent>,
    formatter: Arc<dyn Formatter>,
    process: Arc<dyn ProcessControl>,
    report: Box<dyn Write + Send>,
    inflight: JoinSet<()>,
}

impl fmt::Debug for WatchLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("core", &self.core)
            .field("inflight", &self.inflight.len())
            .finish_non_exhaustive()
    }
}

impl WatchLoop {
    pub fn new(
        core: CoreLoop,
        event_rx: mpsc::Receiver<WatchEvent>,
        formatter: Arc<dyn Formatter>,
        process: Arc<dyn ProcessControl>,
        report: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            core,
            event_rx,
            formatter,
            process,
            report,
            inflight: JoinSet::new(),
        }
    }

    /// Startup pass over `scan`, then the event loop until shutdown.
    pub async fn run(mut self, scan: ScanReport) -> Result<()> {
        info!(root = ?self.core.settings().root, "devloop started");

        let startup = self.core.startup(&scan);
        for action in startup {
            self.execute(action).await;
        }

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "watch loop received event");

            // Timestamps come from tokio's clock so tests can pause time.
            let now = tokio::time::Instant::now().into_std();
            let step = self.core.step(event, now);

            for action in step.actions {
                self.execute(action).await;
            }

            self.reap_finished();

            if !step.keep_running {
                info!("shutdown requested; stopping watch loop");
                break;
            }
        }

        self.finish().await
    }

    async fn execute(&mut self, action: LoopAction) {
        match action {
            LoopAction::Report(rel) => self.report_path(&rel),
            LoopAction::Format { path, rel } => {
                if !self.formatter.format(&path).await {
                    debug!(path = %rel, "formatting failed; continuing");
                }
            }
            LoopAction::Start { spec, rel } => {
                info!(path = %rel, "run");
                let process = Arc::clone(&self.process);
                self.inflight.spawn(async move {
                    log_launch_result(process.start(spec).await);
                });
            }
            LoopAction::Restart { spec, rel } => {
                info!(path = %rel, "restart");
                let process = Arc::clone(&self.process);
                self.inflight.spawn(async move {
                    log_launch_result(process.restart(spec).await);
                });
            }
        }
    }

    fn report_path(&mut self, rel: &str) {
        let res = writeln!(self.report, "{rel}").and_then(|_| self.report.flush());
        if let Err(err) = res {
            warn!(path = %rel, error = %err, "failed to report changed path");
        }
    }

    fn reap_finished(&mut self) {
        while let Some(res) = self.inflight.try_join_next() {
            if let Err(err) = res {
                warn!(error = %err, "launch task failed");
            }
        }
    }

    /// Stop the child, then let queued launch tasks observe the shutdown.
    async fn finish(mut self) -> Result<()> {
        if let Err(err) = self.process.shutdown().await {
            error!(error = %err, "failed to shut down supervised process");
        }

        while let Some(res) = self.inflight.join_next().await {
            if let Err(err) = res {
                warn!(error = %err, "launch task failed");
            }
        }

        info!("devloop stopped");
        Ok(())
    }
}

fn log_launch_result(res: Result<()>) {
    match res {
        Ok(()) => {}
        Err(err) if is_skipped_launch(&err) => debug!(error = %err, "launch skipped"),
        Err(err) => error!(error = %err, "failed to launch program"),
    }
}

/// Rejections that are expected while launches race each other or the
/// shutdown: the supervisor is already busy or already gone.
fn is_skipped_launch(err: &DevloopError) -> bool {
    matches!(
        err,
        DevloopError::ShuttingDown | DevloopError::AlreadyRunning { .. }
    )
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::{CommandSpec, Supervisor};

    #[tokio::test]
    async fn start_losing_the_race_to_a_restart_is_not_an_error() {
        let sup = Supervisor::new();
        sup.restart(CommandSpec::shell("sleep 30")).await.unwrap();

        let err = sup.start(CommandSpec::shell("sleep 30")).await.unwrap_err();
        assert!(is_skipped_launch(&err), "{err}");
        assert_eq!(sup.launches().await, 1);

        sup.shutdown().await.unwrap();
        let err = sup.start(CommandSpec::shell("sleep 30")).await.unwrap_err();
        assert!(is_skipped_launch(&err));
    }

    #[tokio::test]
    async fn unlaunchable_program_is_reported() {
        let sup = Supervisor::new();
        let err = sup
            .start(CommandSpec::new("devloop-no-such-program", ["x"]))
            .await
            .unwrap_err();
        assert!(!is_skipped_launch(&err));
    }
}
