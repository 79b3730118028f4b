// src/watch/scan.rs

//! One pass over the existing tree at startup.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::classify::FileClassifier;
use crate::fs::FileSystem;

/// Deeper than this is almost certainly a symlink cycle.
const MAX_SCAN_DEPTH: usize = 64;

/// Relevant files found under the root, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Every relevant source file.
    pub sources: Vec<PathBuf>,
    /// The subset of `sources` that are entry points.
    pub entry_points: Vec<PathBuf>,
}

impl ScanReport {
    /// The entry point that gets supervised: the first one found.
    pub fn primary_entry_point(&self) -> Option<&Path> {
        self.entry_points.first().map(PathBuf::as_path)
    }
}

/// Walk `root` depth-first, visiting directory entries in name order.
///
/// Unreadable directories are logged and skipped.
pub fn scan_tree(fs: &dyn FileSystem, root: &Path, classifier: &dyn FileClassifier) -> ScanReport {
    let mut report = ScanReport::default();
    visit(fs, root, classifier, 0, &mut report);
    debug!(
        sources = report.sources.len(),
        entry_points = report.entry_points.len(),
        "startup scan finished"
    );
    report
}

fn visit(
    fs: &dyn FileSystem,
    dir: &Path,
    classifier: &dyn FileClassifier,
    depth: usize,
    report: &mut ScanReport,
) {
    if depth > MAX_SCAN_DEPTH {
        warn!(?dir, "scan depth limit reached; not descending");
        return;
    }

    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(?dir, error = %err, "cannot read directory during scan");
            return;
        }
    };

    for entry in entries {
        if fs.is_dir(&entry) {
            if !classifier.skip_directory(&entry) {
                visit(fs, &entry, classifier, depth + 1, report);
            }
        } else if classifier.is_relevant_source_file(&entry) {
            if classifier.is_entry_point(&entry) {
                report.entry_points.push(entry.clone());
            }
            report.sources.push(entry);
        }
    }
}
