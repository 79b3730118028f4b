// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (symlinked roots, `/private/var` on macOS), both paths are
///   canonicalized and we try again.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_forward_slashes(rel));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_forward_slashes(rel));
        }
    }

    None
}

/// Relative path for log lines; falls back to the full path.
pub fn display_path(root: &Path, path: &Path) -> String {
    relative_str(root, path).unwrap_or_else(|| path.display().to_string())
}

/// True if any component of a root-relative path is hidden (`.git/x`, `.env`).
pub fn is_hidden(rel: &str) -> bool {
    rel.split('/')
        .any(|component| component.starts_with('.') && component != "." && component != "..")
}

fn to_forward_slashes(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
