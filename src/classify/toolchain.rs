// src/classify/toolchain.rs

//! Extension + content-pattern classifier.
//!
//! Defaults describe Go (`*.go`, `package main` with `func main()`), but
//! everything comes from the `[source]` and `[watch]` config sections.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::{debug, trace};

use crate::classify::FileClassifier;
use crate::config::ConfigFile;
use crate::errors::{DevloopError, Result};
use crate::fs::FileSystem;
use crate::watch::path_utils::{is_hidden, relative_str};

#[derive(Debug, Clone)]
pub struct ToolchainClassifier {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    extensions: Vec<String>,
    exclude: GlobSet,
    entry_patterns: Vec<Regex>,
}

impl ToolchainClassifier {
    /// Build a classifier for files under `root`.
    pub fn from_config(
        cfg: &ConfigFile,
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in cfg.watch.exclude.iter() {
            let glob = Glob::new(pattern).map_err(|e| {
                DevloopError::ConfigError(format!("invalid exclude glob '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| DevloopError::ConfigError(format!("building exclude set: {e}")))?;

        let entry_patterns = cfg
            .source
            .entry_point
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    DevloopError::ConfigError(format!("invalid entry_point regex '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.into(),
            fs,
            extensions: cfg.source.extensions.clone(),
            exclude,
            entry_patterns,
        })
    }

    /// Root-relative path if it is neither hidden nor excluded.
    fn visible_rel(&self, path: &Path) -> Option<String> {
        let rel = relative_str(&self.root, path)?;
        if is_hidden(&rel) || self.exclude.is_match(&rel) {
            trace!(rel = %rel, "hidden or excluded");
            return None;
        }
        Some(rel)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

impl FileClassifier for ToolchainClassifier {
    fn is_relevant_source_file(&self, path: &Path) -> bool {
        self.has_source_extension(path)
            && self.visible_rel(path).is_some()
            && self.fs.is_file(path)
    }

    fn is_entry_point(&self, path: &Path) -> bool {
        if !self.is_relevant_source_file(path) {
            return false;
        }
        match self.fs.read_to_string(path) {
            Ok(contents) => self.entry_patterns.iter().all(|re| re.is_match(&contents)),
            Err(err) => {
                debug!(?path, error = %err, "unreadable source; not an entry point");
                false
            }
        }
    }

    fn skip_directory(&self, path: &Path) -> bool {
        if path == self.root {
            return false;
        }
        match relative_str(&self.root, path) {
            // Globs like `vendor/**` need a trailing component to match.
            Some(rel) => {
                is_hidden(&rel) || self.exclude.is_match(&rel) || self.exclude.is_match(format!("{rel}/x"))
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const MAIN_GO: &str = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";

    fn classifier(fs: &MockFileSystem) -> ToolchainClassifier {
        ToolchainClassifier::from_config(&ConfigFile::default(), "/repo", Arc::new(fs.clone()))
            .unwrap()
    }

    #[test]
    fn go_files_are_relevant() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/pkg/x.go", "package pkg\n");
        fs.add_file("/repo/README.md", "# readme\n");
        let c = classifier(&fs);

        assert!(c.is_relevant_source_file(Path::new("/repo/pkg/x.go")));
        assert!(!c.is_relevant_source_file(Path::new("/repo/README.md")));
        assert!(!c.is_relevant_source_file(Path::new("/repo/pkg")));
        assert!(!c.is_relevant_source_file(Path::new("/repo/gone.go")));
    }

    #[test]
    fn hidden_and_vendored_files_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/.hidden.go", MAIN_GO);
        fs.add_file("/repo/.git/x.go", MAIN_GO);
        fs.add_file("/repo/vendor/lib/x.go", MAIN_GO);
        let c = classifier(&fs);

        assert!(!c.is_relevant_source_file(Path::new("/repo/.hidden.go")));
        assert!(!c.is_relevant_source_file(Path::new("/repo/.git/x.go")));
        assert!(!c.is_relevant_source_file(Path::new("/repo/vendor/lib/x.go")));
        assert!(c.skip_directory(Path::new("/repo/vendor")));
        assert!(c.skip_directory(Path::new("/repo/.git")));
        assert!(!c.skip_directory(Path::new("/repo")));
    }

    #[test]
    fn entry_point_needs_main_package_and_main_func() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/app.go", MAIN_GO);
        fs.add_file("/repo/helpers.go", "package main\n\nfunc helper() {}\n");
        fs.add_file("/repo/lib/lib.go", "package lib\n\nfunc main() {}\n");
        let c = classifier(&fs);

        assert!(c.is_entry_point(Path::new("/repo/app.go")));
        assert!(!c.is_entry_point(Path::new("/repo/helpers.go")));
        assert!(!c.is_entry_point(Path::new("/repo/lib/lib.go")));
    }

    #[test]
    fn unparsable_contents_are_not_an_entry_point() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/broken.go", "func main( {");
        let c = classifier(&fs);
        assert!(c.is_relevant_source_file(Path::new("/repo/broken.go")));
        assert!(!c.is_entry_point(Path::new("/repo/broken.go")));
    }
}
