// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Format changed sources and restart the program under development.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch.
    ///
    /// Default: the current working directory.
    #[arg(value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Only format; never start the entry point.
    #[arg(short = 'n', long)]
    pub no_run: bool,

    /// File fed to the supervised program's stdin.
    ///
    /// Falls back to devloop's own stdin if the file cannot be opened.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Debounce window in whole seconds (default 1).
    #[arg(short = 'd', long = "delay", value_name = "SECS")]
    pub delay: Option<u64>,

    /// Path to a `Devloop.toml` config file.
    ///
    /// If omitted, `Devloop.toml` in the watched directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
