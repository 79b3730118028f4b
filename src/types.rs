/// Whether the daemon supervises an entry point or only formats.
///
/// - `FormatAndRun`: format changed sources and restart the supervised
///   program when its entry point changes (default behaviour).
/// - `FormatOnly`: `-n`; the supervisor is never asked to start anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    FormatAndRun,
    FormatOnly,
}

impl RunMode {
    pub fn from_no_run(no_run: bool) -> Self {
        if no_run {
            RunMode::FormatOnly
        } else {
            RunMode::FormatAndRun
        }
    }

    pub fn allows_running(self) -> bool {
        matches!(self, RunMode::FormatAndRun)
    }
}

/// How accepted changes are surfaced.
///
/// Detected once at startup from the type of stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Format and run as usual; logs go to stderr.
    #[default]
    Interactive,
    /// stdout is a named pipe: print changed relative paths, one per line,
    /// and perform no side effects.
    ReportOnly,
}

impl OutputMode {
    pub fn from_pipe(is_pipe: bool) -> Self {
        if is_pipe {
            OutputMode::ReportOnly
        } else {
            OutputMode::Interactive
        }
    }

    pub fn is_report_only(self) -> bool {
        matches!(self, OutputMode::ReportOnly)
    }

    /// Inspect the process's stdout.
    #[cfg(unix)]
    pub fn detect() -> Self {
        use nix::sys::stat::{SFlag, fstat};

        let is_pipe = match fstat(nix::libc::STDOUT_FILENO) {
            Ok(stat) => {
                SFlag::from_bits_truncate(stat.st_mode) & SFlag::S_IFMT == SFlag::S_IFIFO
            }
            Err(_) => false,
        };
        Self::from_pipe(is_pipe)
    }

    #[cfg(not(unix))]
    pub fn detect() -> Self {
        OutputMode::Interactive
    }
}
