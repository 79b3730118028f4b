// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] turns config argv templates into spawnable `CommandSpec`s.
//! - [`backend`] defines the `Formatter` / `ProcessControl` seams the watch
//!   loop talks to.
//! - [`formatter`] runs the formatting tool and swallows its failures.
//! - [`supervisor`] owns the single long-running child and its process group.

pub mod backend;
pub mod command;
pub mod formatter;
pub mod supervisor;

pub use backend::{Formatter, ProcessControl};
pub use command::{CommandSpec, CommandTemplate};
pub use formatter::CommandFormatter;
pub use supervisor::{Supervisor, SupervisorState};
