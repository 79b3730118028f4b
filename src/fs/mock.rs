// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(String),
    Dir,
}

/// In-memory tree keyed by full path.
///
/// Directories are created implicitly for every ancestor of an added file.
/// Clones share the same tree, so a test can keep a handle and mutate files
/// after handing the filesystem to a classifier.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.lock().get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        match entries.get(path) {
            Some(MockEntry::Dir) => Ok(entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created_and_listed_in_order() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/pkg/b.go", "package pkg");
        fs.add_file("/repo/a.go", "package main");

        assert!(fs.is_dir(Path::new("/repo/pkg")));
        assert_eq!(
            fs.read_dir(Path::new("/repo")).unwrap(),
            vec![PathBuf::from("/repo/a.go"), PathBuf::from("/repo/pkg")]
        );
        assert!(fs.read_dir(Path::new("/repo/a.go")).is_err());
    }
}
