//! File access abstraction for file-backed configuration sources.
//!
//! JSON sources read their backing files through a [`FileProvider`], so the
//! same source list can be served from disk or from an in-memory set of files.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves configuration files by relative path.
pub trait FileProvider: Debug + Send + Sync {
    /// Read the whole file at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>>;

    /// Location of `path` on disk, if this provider is backed by the filesystem.
    ///
    /// Only files with a physical path can be watched for changes.
    fn physical_path(&self, _path: &Path) -> Option<PathBuf> {
        None
    }
}

/// Files under a root directory on disk.
#[derive(Debug, Clone)]
pub struct PhysicalFileProvider {
    root: PathBuf,
}

impl PhysicalFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileProvider for PhysicalFileProvider {
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.root.join(path)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn physical_path(&self, path: &Path) -> Option<PathBuf> {
        Some(self.root.join(path))
    }
}

/// Files held in memory, e.g. embedded defaults or test fixtures. Never watched.
#[derive(Debug, Default)]
pub struct InMemoryFileProvider {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl InMemoryFileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Remove a file; returns its previous contents.
    pub fn remove(&self, path: &Path) -> Option<String> {
        self.files.write().remove(path)
    }
}

impl FileProvider for InMemoryFileProvider {
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(self.files.read().get(path).cloned())
    }
}
