//! Resolution memoization
//!
//! Entries are write-once: the first outcome stored for a key is the one
//! every later lookup sees, so concurrent workers racing on the same key
//! agree on the answer.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

/// A memoized outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Resolved to a project or external node id
    Resolved(String),
    /// Attempted and confirmed not to match anything
    NoMatch,
}

impl Resolution {
    /// Convert to the public `Option` form
    pub fn into_option(self) -> Option<String> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::NoMatch => None,
        }
    }
}

impl From<Option<String>> for Resolution {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(id) => Resolution::Resolved(id),
            None => Resolution::NoMatch,
        }
    }
}

/// Cache keyed by (name, context project root)
///
/// A key that is absent has not been attempted yet.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<(String, String), Resolution>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a memoized outcome, counting the hit or miss
    pub fn get(&self, name: &str, context: &str) -> Option<Resolution> {
        let key = (name.to_string(), context.to_string());
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            },
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    /// Store an outcome unless one is already present; returns the stored one
    pub fn insert(&self, name: &str, context: &str, resolution: Resolution) -> Resolution {
        self.entries
            .entry((name.to_string(), context.to_string()))
            .or_insert(resolution)
            .value()
            .clone()
    }

    /// Look up, computing and storing the outcome on a miss
    pub fn get_or_compute(
        &self,
        name: &str,
        context: &str,
        compute: impl FnOnce() -> Resolution,
    ) -> Resolution {
        match self.get(name, context) {
            Some(resolution) => resolution,
            None => self.insert(name, context, compute()),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compute
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Statistics for every cache a locator owns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResolverStats {
    /// (specifier, context) cache
    pub imports: CacheStats,
    /// (package name, context) cache
    pub packages: CacheStats,
    /// Package descriptor cache
    pub descriptors: CacheStats,
    /// Whether the compiler configuration has been loaded
    pub compiler_config_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_absent_vs_no_match() {
        let cache = ResolutionCache::new();

        assert_eq!(cache.get("left-pad", "apps/a"), None);
        cache.insert("left-pad", "apps/a", Resolution::NoMatch);
        assert_eq!(cache.get("left-pad", "apps/a"), Some(Resolution::NoMatch));
        assert_eq!(cache.get("left-pad", "apps/b"), None);
    }

    #[test]
    fn test_write_once() {
        let cache = ResolutionCache::new();

        let first = cache.insert("@org/a", "apps/a", Resolution::Resolved("a".to_string()));
        let second = cache.insert("@org/a", "apps/a", Resolution::NoMatch);

        assert_eq!(first, Resolution::Resolved("a".to_string()));
        assert_eq!(second, Resolution::Resolved("a".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_compute_runs_once() {
        let cache = ResolutionCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let result = cache.get_or_compute("x", "ctx", || {
                calls += 1;
                Resolution::NoMatch
            });
            assert_eq!(result, Resolution::NoMatch);
        }

        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_inserts_agree() {
        let cache = Arc::new(ResolutionCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.insert("shared", "ctx", Resolution::Resolved(format!("p{}", i)))
                })
            })
            .collect();

        let results: Vec<Resolution> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let stored = cache.get("shared", "ctx").unwrap();
        assert!(results.iter().all(|r| *r == stored));
    }

    #[test]
    fn test_resolution_conversions() {
        assert_eq!(Resolution::from(Some("a".to_string())).into_option(), Some("a".to_string()));
        assert_eq!(Resolution::from(None).into_option(), None);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
