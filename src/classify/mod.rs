// src/classify/mod.rs

//! Deciding which files matter.
//!
//! The watch loop only ever asks two questions about a path: is it a source
//! file we format, and is it a program we can run. Answering them is the job
//! of a language toolchain, so it sits behind [`FileClassifier`]; the
//! production implementation is [`ToolchainClassifier`], tests plug in fakes.

pub mod toolchain;

use std::fmt::Debug;
use std::path::Path;

pub use toolchain::ToolchainClassifier;

/// Pure queries over file metadata and contents.
///
/// Implementations must not fail: anything unreadable or unparsable is
/// simply "no".
pub trait FileClassifier: Send + Sync + Debug {
    /// Source file eligible for formatting. Directories, hidden files and
    /// files with other extensions are not.
    fn is_relevant_source_file(&self, path: &Path) -> bool;

    /// Source file that defines a standalone runnable program.
    fn is_entry_point(&self, path: &Path) -> bool;

    /// Directory the startup scan should not descend into.
    fn skip_directory(&self, _path: &Path) -> bool {
        false
    }
}
