//! Build output access.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;
use ssr_core::{ArtifactKind, SsrError, SsrResult};

/// Read access to a build output directory.
pub trait OutputFs: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool;
}

/// Build output on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskOutput;

impl OutputFs for DiskOutput {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Build output held in memory, for hosts that do not write it to disk.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.write().insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: &Path) -> Option<String> {
        self.files.write().remove(path)
    }
}

impl OutputFs for MemoryOutput {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not in memory", path.display()))
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }
}

/// Path of an artifact inside `dir`.
pub fn artifact_path(dir: &Path, kind: ArtifactKind) -> PathBuf {
    dir.join(kind.file_name())
}

/// Read an artifact as text.
pub fn read_artifact(fs: &dyn OutputFs, dir: &Path, kind: ArtifactKind) -> SsrResult<String> {
    let path = artifact_path(dir, kind);
    fs.read_to_string(&path)
        .map_err(|source| SsrError::ArtifactRead { path, source })
}

/// Read an artifact as JSON.
pub fn read_json_artifact(fs: &dyn OutputFs, dir: &Path, kind: ArtifactKind) -> SsrResult<Value> {
    let raw = read_artifact(fs, dir, kind)?;
    serde_json::from_str(&raw).map_err(|source| SsrError::ArtifactParse {
        path: artifact_path(dir, kind),
        source,
    })
}
