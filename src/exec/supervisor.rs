// src/exec/supervisor.rs

//! Owner of the single supervised child process.
//!
//! State machine:
//!
//! ```text
//!   Idle ──start──▶ Starting ──spawned──▶ Running ──stop──▶ Stopping ──reaped──▶ Idle
//!     ▲                 │                    │
//!     └──spawn failed───┘                    └──exited on its own──▶ Idle
//!
//!   any ──shutdown──▶ ShuttingDown (terminal)
//! ```
//!
//! Every transition happens while holding one async mutex, so a restart's
//! stop → wait → start sequence can never interleave with another restart.
//! The child is spawned in its own process group and stopped with SIGKILL to
//! the whole group, which also takes down whatever it forked (`go run`
//! compiles to a temp binary and execs it as a grandchild).

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::Child;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{DevloopError, Result};
use crate::exec::backend::ProcessControl;
use crate::exec::command::CommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    Stopping,
    ShuttingDown,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::Stopping => "stopping",
            SupervisorState::ShuttingDown => "shutting down",
        };
        f.write_str(s)
    }
}

/// Cheap to clone; all clones share the same child slot.
#[derive(Debug, Clone)]
pub struct Supervisor {
    slot: Arc<Mutex<Slot>>,
}

#[derive(Debug)]
struct Slot {
    state: SupervisorState,
    child: Option<SupervisedChild>,
    /// Process group of the last launch, kept until it has been signalled.
    /// Outlives `child`: the leader can exit while group members keep running.
    group: Option<u32>,
    launches: u64,
}

/// A launched child plus the task that reaps it.
#[derive(Debug)]
struct SupervisedChild {
    pid: Option<u32>,
    cmd: String,
    /// Asks the reaper to kill the leader; the group is signalled separately.
    kill: Option<oneshot::Sender<()>>,
    reaper: JoinHandle<Option<ExitStatus>>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state: SupervisorState::Idle,
                child: None,
                group: None,
                launches: 0,
            })),
        }
    }

    /// Current state, after noticing a child that exited on its own.
    pub async fn state(&self) -> SupervisorState {
        let mut slot = self.slot.lock().await;
        slot.refresh().await;
        slot.state
    }

    /// PID of the running child (which is also its process-group id).
    pub async fn current_pid(&self) -> Option<u32> {
        let mut slot = self.slot.lock().await;
        slot.refresh().await;
        slot.child.as_ref().and_then(|c| c.pid)
    }

    /// Number of successful launches so far.
    pub async fn launches(&self) -> u64 {
        self.slot.lock().await.launches
    }

    pub async fn start(&self, spec: CommandSpec) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.refresh().await;
        match slot.state {
            SupervisorState::ShuttingDown => Err(DevloopError::ShuttingDown),
            SupervisorState::Idle => slot.launch(spec),
            other => Err(DevloopError::AlreadyRunning {
                cmd: spec.to_string(),
                state: other.to_string(),
            }),
        }
    }

    pub async fn restart(&self, spec: CommandSpec) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.refresh().await;
        if slot.state == SupervisorState::ShuttingDown {
            return Err(DevloopError::ShuttingDown);
        }
        if slot.child.is_some() {
            info!(cmd = %spec, "restarting");
        }
        slot.stop().await;
        slot.launch(spec)
    }

    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.stop().await;
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.stop().await;
        if slot.state != SupervisorState::ShuttingDown {
            debug!(launches = slot.launches, "supervisor shut down");
        }
        slot.state = SupervisorState::ShuttingDown;
        Ok(())
    }
}

impl Slot {
    /// Move `Running` back to `Idle` if the reaper already finished.
    async fn refresh(&mut self) {
        let finished = self
            .child
            .as_ref()
            .is_some_and(|c| c.reaper.is_finished());
        if !finished {
            return;
        }
        if let Some(child) = self.child.take() {
            // Already finished, so this does not block.
            let _ = child.reaper.await;
            if self.state == SupervisorState::Running {
                self.state = SupervisorState::Idle;
            }
        }
    }

    /// Spawn `spec` in a fresh process group. Must be called from `Idle`.
    fn launch(&mut self, spec: CommandSpec) -> Result<()> {
        self.state = SupervisorState::Starting;

        let mut cmd = spec.to_command();
        cmd.stdin(open_stdin(spec.stdin.as_deref()))
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.state = SupervisorState::Idle;
                return Err(DevloopError::Launch {
                    cmd: spec.to_string(),
                    source,
                });
            }
        };

        let pid = child.id();
        self.group = pid;
        let cmd_str = spec.to_string();
        let (kill_tx, kill_rx) = oneshot::channel();
        let reaper = tokio::spawn(reap(child, pid, cmd_str.clone(), kill_rx));

        info!(pid, cmd = %cmd_str, "run");
        self.child = Some(SupervisedChild {
            pid,
            cmd: cmd_str,
            kill: Some(kill_tx),
            reaper,
        });
        self.launches += 1;
        self.state = SupervisorState::Running;
        Ok(())
    }

    /// Kill the child's group and wait until the leader has been reaped.
    ///
    /// The group is signalled even when the leader already exited, so
    /// processes it left behind do not survive a restart or shutdown.
    async fn stop(&mut self) {
        if let Some(pgid) = self.group.take() {
            kill_group(pgid);
        }

        let Some(mut child) = self.child.take() else {
            if self.state != SupervisorState::ShuttingDown {
                self.state = SupervisorState::Idle;
            }
            return;
        };

        let previous = self.state;
        self.state = SupervisorState::Stopping;

        if child.reaper.is_finished() {
            debug!(pid = child.pid, "leader already exited");
        } else {
            info!(pid = child.pid, cmd = %child.cmd, "stopping");
            if let Some(kill) = child.kill.take() {
                if kill.send(()).is_err() {
                    debug!(pid = child.pid, "child exited while being stopped");
                }
            }
        }

        match child.reaper.await {
            Ok(Some(status)) => debug!(pid = child.pid, %status, "child reaped"),
            Ok(None) => {}
            Err(err) => warn!(pid = child.pid, error = %err, "reaper task failed"),
        }

        self.state = if previous == SupervisorState::ShuttingDown {
            SupervisorState::ShuttingDown
        } else {
            SupervisorState::Idle
        };
    }
}

/// Wait for the child; on request, kill the leader first.
async fn reap(
    mut child: Child,
    pid: Option<u32>,
    cmd: String,
    kill_rx: oneshot::Receiver<()>,
) -> Option<ExitStatus> {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill_rx => {
            // Sender dropped also lands here: nobody owns this child any more.
            if let Err(err) = child.start_kill() {
                debug!(pid, error = %err, "kill after group signal failed; already exiting");
            }
            child.wait().await
        }
    };

    match status {
        Ok(status) => {
            info!(
                pid,
                cmd = %cmd,
                exit_code = status.code().unwrap_or(-1),
                success = status.success(),
                "process exited"
            );
            Some(status)
        }
        Err(err) => {
            warn!(pid, error = %err, "failed waiting for child");
            None
        }
    }
}

/// SIGKILL the whole process group led by `pid`.
///
/// `ESRCH` means the group is already gone, which is the state we want.
#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if raw <= 0 {
        return;
    }
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pgid = raw, "sent SIGKILL to process group"),
        Err(Errno::ESRCH) => debug!(pgid = raw, "process group already gone"),
        Err(err) => warn!(pgid = raw, error = %err, "failed to signal process group"),
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

/// stdin for the child: the configured file, else our own stdin.
fn open_stdin(path: Option<&Path>) -> Stdio {
    let Some(path) = path else {
        return Stdio::inherit();
    };
    match std::fs::File::open(path) {
        Ok(file) => Stdio::from(file),
        Err(err) => {
            warn!(?path, error = %err, "cannot open input file; using stdin");
            Stdio::inherit()
        }
    }
}

impl ProcessControl for Supervisor {
    fn start(&self, spec: CommandSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(Supervisor::start(self, spec))
    }

    fn restart(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(Supervisor::restart(self, spec))
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(Supervisor::stop(self))
    }

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(Supervisor::shutdown(self))
    }
}
