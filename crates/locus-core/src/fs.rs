//! Filesystem abstraction used by every resolver.
//!
//! Resolution only ever needs three questions answered: read a text file,
//! is this a file, is this a directory. Routing them through a trait lets the
//! resolver run against an in-memory tree in tests and lets callers count
//! how much disk work a resolution pass performs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, RwLock};

use crate::error::{LocusError, LocusResult};
use crate::utils::normalize_utf8;

/// Read-only view of a filesystem
pub trait FileSystem: Send + Sync {
    /// Read a UTF-8 file
    fn read_to_string(&self, path: &Utf8Path) -> LocusResult<String>;

    /// Check whether `path` is an existing file
    fn is_file(&self, path: &Utf8Path) -> bool;

    /// Check whether `path` is an existing directory
    fn is_dir(&self, path: &Utf8Path) -> bool;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> LocusResult<String> {
        std::fs::read_to_string(path)
            .map_err(|e| LocusError::io(format!("Failed to read {}", path), e))
    }

    fn is_file(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }
}

/// In-memory filesystem
///
/// Directories exist implicitly as ancestors of the files added. Every
/// `read_to_string` call is counted per path.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<Utf8PathBuf, String>>,
    dirs: RwLock<BTreeSet<Utf8PathBuf>>,
    reads: Mutex<HashMap<Utf8PathBuf, usize>>,
    total_reads: AtomicUsize,
}

impl MemoryFileSystem {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `add_file`
    pub fn with_file(self, path: impl AsRef<Utf8Path>, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Add (or replace) a file, creating its ancestor directories
    pub fn add_file(&self, path: impl AsRef<Utf8Path>, contents: impl Into<String>) {
        let path = normalize_utf8(path.as_ref());
        {
            let mut dirs = self.dirs.write();
            let mut current = path.parent();
            while let Some(dir) = current {
                if !dirs.insert(dir.to_path_buf()) {
                    break;
                }
                current = dir.parent();
            }
        }
        self.files.write().insert(path, contents.into());
    }

    /// Number of reads performed for `path`
    pub fn read_count(&self, path: impl AsRef<Utf8Path>) -> usize {
        let path = normalize_utf8(path.as_ref());
        self.reads.lock().get(&path).copied().unwrap_or(0)
    }

    /// Number of reads performed across all paths
    pub fn total_reads(&self) -> usize {
        self.total_reads.load(Ordering::Relaxed)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> LocusResult<String> {
        let path = normalize_utf8(path);
        self.total_reads.fetch_add(1, Ordering::Relaxed);
        *self.reads.lock().entry(path.clone()).or_insert(0) += 1;

        self.files.read().get(&path).cloned().ok_or_else(|| {
            LocusError::io(
                format!("Failed to read {}", path),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }

    fn is_file(&self, path: &Utf8Path) -> bool {
        self.files.read().contains_key(&normalize_utf8(path))
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        self.dirs.read().contains(&normalize_utf8(path))
    }
}
