use std::collections::HashSet;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use devloop::classify::FileClassifier;
use devloop::errors::{DevloopError, Result};
use devloop::exec::{CommandSpec, Formatter, ProcessControl};

/// A formatter that records every path it was asked to format.
#[derive(Debug, Clone, Default)]
pub struct FakeFormatter {
    formatted: Arc<Mutex<Vec<PathBuf>>>,
    succeed: bool,
}

impl FakeFormatter {
    pub fn new() -> Self {
        Self {
            formatted: Arc::default(),
            succeed: true,
        }
    }

    /// A formatter whose tool always fails.
    pub fn failing() -> Self {
        Self {
            formatted: Arc::default(),
            succeed: false,
        }
    }

    pub fn formatted(&self) -> Vec<PathBuf> {
        self.formatted.lock().unwrap().clone()
    }
}

impl Formatter for FakeFormatter {
    fn format<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.formatted.lock().unwrap().push(path.to_path_buf());
            self.succeed
        })
    }
}

/// One call made against [`FakeProcess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    Start(CommandSpec),
    Restart(CommandSpec),
    Stop,
    Shutdown,
}

/// Records supervisor calls without spawning anything.
///
/// Mirrors the real supervisor's rejection of launches after shutdown.
#[derive(Debug, Clone, Default)]
pub struct FakeProcess {
    calls: Arc<Mutex<Vec<ProcessCall>>>,
    shut_down: Arc<Mutex<bool>>,
}

impl FakeProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `start` + `restart` calls accepted before shutdown.
    pub fn launches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProcessCall::Start(_) | ProcessCall::Restart(_)))
            .count()
    }

    fn record_launch(&self, call: ProcessCall) -> Result<()> {
        if *self.shut_down.lock().unwrap() {
            return Err(DevloopError::ShuttingDown);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl ProcessControl for FakeProcess {
    fn start(&self, spec: CommandSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.record_launch(ProcessCall::Start(spec)) })
    }

    fn restart(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.record_launch(ProcessCall::Restart(spec)) })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ProcessCall::Stop);
            Ok(())
        })
    }

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            *self.shut_down.lock().unwrap() = true;
            self.calls.lock().unwrap().push(ProcessCall::Shutdown);
            Ok(())
        })
    }
}

/// Classifier driven by explicit path sets instead of file contents.
#[derive(Debug, Clone, Default)]
pub struct FakeClassifier {
    sources: HashSet<PathBuf>,
    entry_points: HashSet<PathBuf>,
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(path.into());
        self
    }

    /// Entry points are sources too.
    pub fn with_entry_point(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.sources.insert(path.clone());
        self.entry_points.insert(path);
        self
    }
}

impl FileClassifier for FakeClassifier {
    fn is_relevant_source_file(&self, path: &Path) -> bool {
        self.sources.contains(path)
    }

    fn is_entry_point(&self, path: &Path) -> bool {
        self.entry_points.contains(path)
    }
}

/// `Write` sink whose contents can be inspected after the loop consumed it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
