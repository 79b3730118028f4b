// src/exec/command.rs

//! Command templates and concrete command specs.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Placeholder replaced by the target file's path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// argv with an optional `{file}` placeholder, e.g. `["go", "run", "{file}"]`.
///
/// If no argument contains the placeholder the path is appended as the last
/// argument, so `["gofmt", "-w"]` works too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    argv: Vec<String>,
}

impl CommandTemplate {
    /// `argv` must be non-empty; config validation guarantees that.
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn render(&self, file: &Path) -> CommandSpec {
        let file = file.to_string_lossy();
        let mut substituted = false;
        let mut argv: Vec<String> = self
            .argv
            .iter()
            .map(|arg| {
                if arg.contains(FILE_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(FILE_PLACEHOLDER, &file)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            argv.push(file.into_owned());
        }

        let program = if argv.is_empty() {
            String::new()
        } else {
            argv.remove(0)
        };

        CommandSpec {
            program,
            args: argv,
            cwd: None,
            stdin: None,
        }
    }
}

/// A fully resolved command ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits ours if `None`.
    pub cwd: Option<PathBuf>,
    /// File to feed to stdin; only honoured by the supervisor.
    pub stdin: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            stdin: None,
        }
    }

    /// `sh -c <script>`; handy for ad-hoc runners and tests.
    pub fn shell(script: impl Into<String>) -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C".to_string(), script.into()])
        } else {
            Self::new("sh", ["-c".to_string(), script.into()])
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_stdin(mut self, stdin: Option<PathBuf>) -> Self {
        self.stdin = stdin;
        self
    }

    /// Base `tokio` command; stdio wiring is left to the caller.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(argv: &[&str]) -> CommandTemplate {
        CommandTemplate::new(argv.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn placeholder_is_substituted() {
        let spec = template(&["go", "run", "{file}"]).render(Path::new("/repo/app.go"));
        assert_eq!(spec.program, "go");
        assert_eq!(spec.args, vec!["run", "/repo/app.go"]);
        assert_eq!(spec.to_string(), "go run /repo/app.go");
    }

    #[test]
    fn path_is_appended_without_placeholder() {
        let spec = template(&["gofmt", "-w"]).render(Path::new("x.go"));
        assert_eq!(spec.args, vec!["-w", "x.go"]);
    }

    #[test]
    fn placeholder_inside_an_argument() {
        let spec = template(&["tool", "--target={file}"]).render(Path::new("a.go"));
        assert_eq!(spec.args, vec!["--target=a.go"]);
    }

    #[test]
    fn builders_set_cwd_and_stdin() {
        let spec = CommandSpec::new("cat", Vec::<String>::new())
            .with_cwd("/tmp")
            .with_stdin(Some(PathBuf::from("in.txt")));
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(spec.stdin, Some(PathBuf::from("in.txt")));
    }
}
