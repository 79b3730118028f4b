// src/exec/formatter.rs

//! Runs the configured formatting tool on a single file.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tracing::{debug, info, warn};

use crate::exec::backend::Formatter;
use crate::exec::command::CommandTemplate;
use crate::watch::path_utils::display_path;

/// Formatter backed by an external tool (`gofmt -w {file}` by default).
///
/// The tool's stdout/stderr are inherited so its diagnostics reach the user
/// unchanged. stdin is closed.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    template: CommandTemplate,
    root: PathBuf,
}

impl CommandFormatter {
    /// `root` is only used to shorten paths in log lines.
    pub fn new(template: CommandTemplate, root: impl Into<PathBuf>) -> Self {
        Self {
            template,
            root: root.into(),
        }
    }
}

impl Formatter for CommandFormatter {
    fn format<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let rel = display_path(&self.root, path);
            let spec = self.template.render(path);
            info!(path = %rel, cmd = %spec.program, "format");

            let status = spec
                .to_command()
                .stdin(Stdio::null())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await;

            match status {
                Ok(status) if status.success() => {
                    debug!(path = %rel, "formatter finished");
                    true
                }
                Ok(status) => {
                    warn!(
                        path = %rel,
                        exit_code = status.code().unwrap_or(-1),
                        "formatter exited with failure"
                    );
                    false
                }
                Err(err) => {
                    warn!(path = %rel, cmd = %spec, error = %err, "failed to invoke formatter");
                    false
                }
            }
        })
    }
}
