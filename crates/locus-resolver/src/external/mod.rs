//! External package resolution
//!
//! A bare specifier is matched to an external node through the descriptor
//! of the package that is actually installed for the importing project:
//! the declared name and version must both equal the node's.

use std::collections::HashMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use locus_core::fs::FileSystem;
use locus_core::types::ExternalNode;
use locus_core::utils::normalize_utf8;
use tracing::{debug, trace, warn};

use crate::cache::{CacheStats, Resolution, ResolutionCache};
use crate::descriptor::DescriptorCache;

/// Bare package name of a specifier
///
/// Scoped specifiers keep two segments (`@scope/pkg/sub` -> `@scope/pkg`),
/// everything else keeps one (`lodash/fp` -> `lodash`).
pub fn parse_package_name(specifier: &str) -> &str {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    match specifier.match_indices('/').nth(segments - 1) {
        Some((idx, _)) => &specifier[..idx],
        None => specifier,
    }
}

/// Finds the installed descriptor of a package
pub trait PackageLocator: Send + Sync {
    /// Path of the nearest `package.json` for `package_name`, searching
    /// outward from `from_dir`
    fn locate(&self, package_name: &str, from_dir: &Utf8Path) -> Option<Utf8PathBuf>;
}

/// Searches `<ancestor>/node_modules/<name>/package.json` up to the filesystem root
pub struct NodeModulesLocator {
    fs: Arc<dyn FileSystem>,
    installed_dir: String,
}

impl NodeModulesLocator {
    /// Create a locator for the given installed-dependency directory name
    pub fn new(fs: Arc<dyn FileSystem>, installed_dir: impl Into<String>) -> Self {
        Self {
            fs,
            installed_dir: installed_dir.into(),
        }
    }
}

impl PackageLocator for NodeModulesLocator {
    fn locate(&self, package_name: &str, from_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        normalize_utf8(from_dir).ancestors().find_map(|dir| {
            let candidate = dir
                .join(&self.installed_dir)
                .join(package_name)
                .join("package.json");
            self.fs.is_file(&candidate).then_some(candidate)
        })
    }
}

/// Resolves bare specifiers to external node ids
pub struct ExternalResolver {
    workspace_root: Utf8PathBuf,
    externals: Vec<ExternalNode>,
    /// Declared package name -> indices into `externals`, construction order
    by_name: HashMap<String, Vec<usize>>,
    locator: Arc<dyn PackageLocator>,
    descriptors: Arc<DescriptorCache>,
    cache: ResolutionCache,
}

impl ExternalResolver {
    /// Index `externals`, warning about duplicate (name, version) pairs
    pub fn new(
        workspace_root: impl Into<Utf8PathBuf>,
        externals: Vec<ExternalNode>,
        locator: Arc<dyn PackageLocator>,
        descriptors: Arc<DescriptorCache>,
    ) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, node) in externals.iter().enumerate() {
            let indices = by_name.entry(node.package_name.clone()).or_default();
            if let Some(&first) = indices.iter().find(|&&i| externals[i].version == node.version) {
                warn!(
                    "External nodes '{}' and '{}' both describe {}@{}; '{}' will be used",
                    externals[first].name, node.name, node.package_name, node.version,
                    externals[first].name
                );
            }
            indices.push(idx);
        }

        Self {
            workspace_root: workspace_root.into(),
            externals,
            by_name,
            locator,
            descriptors,
            cache: ResolutionCache::new(),
        }
    }

    /// External node id for `specifier` as seen from `context_root`
    pub fn resolve(&self, specifier: &str, context_root: &str) -> Option<String> {
        let package_name = parse_package_name(specifier);
        self.cache
            .get_or_compute(package_name, context_root, || self.lookup(package_name, context_root))
            .into_option()
    }

    /// Known external nodes, construction order
    pub fn externals(&self) -> &[ExternalNode] {
        &self.externals
    }

    /// Package cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn lookup(&self, package_name: &str, context_root: &str) -> Resolution {
        let from_dir = normalize_utf8(&self.workspace_root.join(context_root));

        let Some(descriptor_path) = self.locator.locate(package_name, &from_dir) else {
            debug!("No installed descriptor for '{}' from {}", package_name, from_dir);
            return Resolution::NoMatch;
        };

        let Some(descriptor) = self.descriptors.get(&descriptor_path) else {
            return Resolution::NoMatch;
        };

        let Some((name, version)) = descriptor.name_and_version() else {
            debug!("Descriptor {} lacks a name or version", descriptor_path);
            return Resolution::NoMatch;
        };

        let matched = self
            .by_name
            .get(name)
            .and_then(|indices| indices.iter().map(|&i| &self.externals[i]).find(|node| node.matches(name, version)));

        match matched {
            Some(node) => {
                trace!("'{}' is installed as {}@{} -> {}", package_name, name, version, node.name);
                Resolution::Resolved(node.name.clone())
            },
            None => {
                debug!("No external node for {}@{}", name, version);
                Resolution::NoMatch
            },
        }
    }
}

impl std::fmt::Debug for ExternalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalResolver")
            .field("workspace_root", &self.workspace_root)
            .field("externals", &self.externals.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_core::fs::MemoryFileSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLocator {
        inner: NodeModulesLocator,
        calls: AtomicUsize,
    }

    impl PackageLocator for CountingLocator {
        fn locate(&self, package_name: &str, from_dir: &Utf8Path) -> Option<Utf8PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.locate(package_name, from_dir)
        }
    }

    fn workspace() -> Arc<MemoryFileSystem> {
        Arc::new(
            MemoryFileSystem::new()
                .with_file(
                    "/ws/node_modules/left-pad/package.json",
                    r#"{ "name": "left-pad", "version": "1.2.0" }"#,
                )
                .with_file(
                    "/ws/apps/legacy/node_modules/left-pad/package.json",
                    r#"{ "name": "left-pad", "version": "0.9.0" }"#,
                )
                .with_file(
                    "/ws/node_modules/@scope/util/package.json",
                    r#"{ "name": "@scope/util", "version": "2.0.0" }"#,
                )
                .with_file("/ws/node_modules/broken/package.json", "{"),
        )
    }

    fn resolver(fs: Arc<MemoryFileSystem>, externals: Vec<ExternalNode>) -> ExternalResolver {
        let locator = Arc::new(NodeModulesLocator::new(fs.clone(), "node_modules"));
        ExternalResolver::new("/ws", externals, locator, Arc::new(DescriptorCache::new(fs)))
    }

    #[test]
    fn test_parse_package_name() {
        assert_eq!(parse_package_name("lodash"), "lodash");
        assert_eq!(parse_package_name("lodash/fp"), "lodash");
        assert_eq!(parse_package_name("@scope/pkg"), "@scope/pkg");
        assert_eq!(parse_package_name("@scope/pkg/deep/path"), "@scope/pkg");
        assert_eq!(parse_package_name("@scope"), "@scope");
        assert_eq!(parse_package_name("node:fs/promises"), "node:fs");
    }

    #[test]
    fn test_locator_walks_ancestors() {
        let fs = workspace();
        let locator = NodeModulesLocator::new(fs, "node_modules");

        assert_eq!(
            locator.locate("left-pad", Utf8Path::new("/ws/apps/legacy")),
            Some(Utf8PathBuf::from("/ws/apps/legacy/node_modules/left-pad/package.json"))
        );
        assert_eq!(
            locator.locate("left-pad", Utf8Path::new("/ws/apps/web")),
            Some(Utf8PathBuf::from("/ws/node_modules/left-pad/package.json"))
        );
        assert_eq!(locator.locate("missing", Utf8Path::new("/ws/apps/web")), None);
    }

    #[test]
    fn test_matches_name_and_version() {
        let resolver = resolver(
            workspace(),
            vec![
                ExternalNode::npm("left-pad", "0.9.0"),
                ExternalNode::npm("left-pad", "1.2.0"),
                ExternalNode::npm("@scope/util", "2.0.0"),
            ],
        );

        assert_eq!(resolver.resolve("left-pad", "apps/web"), Some("npm:left-pad@1.2.0".to_string()));
        assert_eq!(resolver.resolve("left-pad", "apps/legacy"), Some("npm:left-pad@0.9.0".to_string()));
        assert_eq!(
            resolver.resolve("@scope/util/deep/file", "libs/a"),
            Some("npm:@scope/util@2.0.0".to_string())
        );
    }

    #[test]
    fn test_version_mismatch_is_no_match() {
        let resolver = resolver(workspace(), vec![ExternalNode::npm("left-pad", "1.3.0")]);
        assert_eq!(resolver.resolve("left-pad", "apps/web"), None);
    }

    #[test]
    fn test_malformed_or_missing_descriptor_is_no_match() {
        let resolver = resolver(workspace(), vec![ExternalNode::npm("broken", "1.0.0")]);

        assert_eq!(resolver.resolve("broken", "apps/web"), None);
        assert_eq!(resolver.resolve("not-installed", "apps/web"), None);
    }

    #[test]
    fn test_duplicate_externals_first_wins() {
        let mut duplicate = ExternalNode::npm("left-pad", "1.2.0");
        duplicate.name = "npm:left-pad-copy".to_string();

        let resolver = resolver(
            workspace(),
            vec![ExternalNode::npm("left-pad", "1.2.0"), duplicate],
        );
        assert_eq!(resolver.resolve("left-pad", "apps/web"), Some("npm:left-pad@1.2.0".to_string()));
        assert_eq!(resolver.externals().len(), 2);
    }

    #[test]
    fn test_package_cache_is_per_name_and_context() {
        let fs = workspace();
        let locator = Arc::new(CountingLocator {
            inner: NodeModulesLocator::new(fs.clone(), "node_modules"),
            calls: AtomicUsize::new(0),
        });
        let resolver = ExternalResolver::new(
            "/ws",
            vec![ExternalNode::npm("left-pad", "1.2.0")],
            locator.clone(),
            Arc::new(DescriptorCache::new(fs)),
        );

        // Subpath imports share the package entry
        resolver.resolve("left-pad", "apps/web");
        resolver.resolve("left-pad/lib/index.js", "apps/web");
        resolver.resolve("not-installed", "apps/web");
        resolver.resolve("not-installed", "apps/web");
        assert_eq!(locator.calls.load(Ordering::SeqCst), 2);

        resolver.resolve("left-pad", "apps/other");
        assert_eq!(locator.calls.load(Ordering::SeqCst), 3);

        let stats = resolver.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.hits, 2);
    }
}
