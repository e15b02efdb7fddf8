//! Package descriptor cache
//!
//! Each package.json is read and parsed at most once per cache. Unreadable
//! or malformed descriptors are remembered too, as `None`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use dashmap::DashMap;
use locus_config::json::{read_package_json, PackageJson};
use locus_core::fs::FileSystem;
use locus_core::utils::normalize_utf8;
use tracing::debug;

use crate::cache::CacheStats;

/// Absolute descriptor path -> parsed descriptor
pub struct DescriptorCache {
    fs: Arc<dyn FileSystem>,
    entries: DashMap<Utf8PathBuf, Option<Arc<PackageJson>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DescriptorCache {
    /// Create an empty cache reading through `fs`
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Parsed descriptor at `path`, or `None` when it cannot be read or parsed
    pub fn get(&self, path: &Utf8Path) -> Option<Arc<PackageJson>> {
        let path = normalize_utf8(path);
        if let Some(entry) = self.entries.get(&path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let loaded = self.load(&path);
        self.entries.entry(path).or_insert(loaded).value().clone()
    }

    /// Descriptor of the package in directory `dir`, if it has one
    pub fn in_directory(&self, dir: &Utf8Path) -> Option<Arc<PackageJson>> {
        let path = dir.join("package.json");
        if !self.fs.is_file(&path) {
            return None;
        }
        self.get(&path)
    }

    /// Filesystem the cache reads through
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn load(&self, path: &Utf8Path) -> Option<Arc<PackageJson>> {
        match read_package_json(self.fs.as_ref(), path) {
            Ok(descriptor) => Some(Arc::new(descriptor)),
            Err(e) => {
                debug!("Ignoring package descriptor {}: {}", path, e);
                None
            },
        }
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
