//! Project root index
//!
//! Maps normalized, workspace-relative project roots to project names and
//! answers "which project encloses this path" by walking the path's
//! ancestors until one of them is a known root.

use std::collections::HashMap;

use locus_core::types::ProjectNode;
use locus_core::utils::{dirname, escapes_root, has_segment, normalize_path};
use tracing::warn;

/// Longest-enclosing-root lookup over all workspace projects
#[derive(Debug, Clone)]
pub struct ProjectRootIndex {
    /// Normalized root -> project name
    roots: HashMap<String, String>,
    /// Installed-dependency directory name; paths through it never match
    installed_dir: String,
}

impl ProjectRootIndex {
    /// Build the index from every project node
    ///
    /// When two projects declare the same root, the later one wins.
    pub fn new(projects: &[ProjectNode], installed_dir: impl Into<String>) -> Self {
        let mut roots = HashMap::with_capacity(projects.len());

        for project in projects {
            let root = normalize_path(&project.root);
            if let Some(previous) = roots.insert(root.clone(), project.name.clone()) {
                warn!(
                    "Projects '{}' and '{}' share the root '{}'; using '{}'",
                    previous, project.name, root, project.name
                );
            }
        }

        Self {
            roots,
            installed_dir: installed_dir.into(),
        }
    }

    /// Find the project whose root encloses `path`
    ///
    /// `path` is workspace-relative. Paths through the installed-dependency
    /// directory, absolute paths, and paths escaping the workspace never match.
    pub fn find_project_for_path(&self, path: &str) -> Option<&str> {
        let stripped = path.strip_prefix("./").unwrap_or(path);
        let normalized = normalize_path(stripped);

        if has_segment(&normalized, &self.installed_dir)
            || escapes_root(&normalized)
            || normalized.starts_with('/')
        {
            return None;
        }

        let mut current = normalized;
        loop {
            if let Some(project) = self.roots.get(&current) {
                return Some(project.as_str());
            }
            if current == "." {
                return None;
            }
            current = dirname(&current);
        }
    }

    /// Normalized root of a project
    pub fn root_of(&self, project: &str) -> Option<&str> {
        self.roots
            .iter()
            .find(|(_, name)| name.as_str() == project)
            .map(|(root, _)| root.as_str())
    }

    /// Installed-dependency directory name this index rejects
    pub fn installed_dir(&self) -> &str {
        &self.installed_dir
    }

    /// Number of indexed roots
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if no roots are indexed
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All indexed roots, sorted
    pub fn roots(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = self.roots.keys().map(String::as_str).collect();
        roots.sort_unstable();
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index(projects: &[(&str, &str)]) -> ProjectRootIndex {
        let nodes: Vec<ProjectNode> = projects
            .iter()
            .map(|(name, root)| ProjectNode::new(*name, *root))
            .collect();
        ProjectRootIndex::new(&nodes, "node_modules")
    }

    #[test]
    fn test_longest_enclosing_root() {
        let index = index(&[
            ("app1", "apps/app1"),
            ("app1-e2e", "apps/app1/e2e"),
            ("lib", "./apps/lib/"),
        ]);

        assert_eq!(index.find_project_for_path("apps/app1/src/main.ts"), Some("app1"));
        assert_eq!(index.find_project_for_path("apps/app1/e2e/src/app.spec.ts"), Some("app1-e2e"));
        assert_eq!(index.find_project_for_path("./apps/lib/util"), Some("lib"));
        assert_eq!(index.find_project_for_path("apps/lib"), Some("lib"));
        assert_eq!(index.find_project_for_path("apps/other/x.ts"), None);
        assert_eq!(index.find_project_for_path("apps/app10/x.ts"), None);
    }

    #[test]
    fn test_root_project_encloses_everything() {
        let index = index(&[("workspace", "."), ("lib", "libs/lib")]);

        assert_eq!(index.find_project_for_path("libs/lib/src/index.ts"), Some("lib"));
        assert_eq!(index.find_project_for_path("tools/scripts/x.ts"), Some("workspace"));
        assert_eq!(index.find_project_for_path("."), Some("workspace"));

        let empty_root = index_with_empty_root();
        assert_eq!(empty_root.find_project_for_path("anything"), Some("workspace"));
    }

    fn index_with_empty_root() -> ProjectRootIndex {
        ProjectRootIndex::new(&[ProjectNode::new("workspace", "")], "node_modules")
    }

    #[test]
    fn test_rejects_installed_dependency_paths() {
        let index = index(&[("workspace", "."), ("vendored", "node_modules/vendored")]);

        assert_eq!(index.find_project_for_path("node_modules/vendored/index.js"), None);
        assert_eq!(index.find_project_for_path("libs/a/node_modules/x/index.js"), None);
        assert_eq!(index.find_project_for_path("libs/a/src/index.ts"), Some("workspace"));
    }

    #[test]
    fn test_custom_installed_dir() {
        let nodes = vec![ProjectNode::new("workspace", ".")];
        let index = ProjectRootIndex::new(&nodes, "deps");

        assert_eq!(index.find_project_for_path("deps/x/index.js"), None);
        assert_eq!(index.find_project_for_path("node_modules/x/index.js"), Some("workspace"));
    }

    #[test]
    fn test_escaping_and_absolute_paths() {
        let index = index(&[("workspace", ".")]);

        assert_eq!(index.find_project_for_path("../outside/x.ts"), None);
        assert_eq!(index.find_project_for_path("libs/../../x.ts"), None);
        assert_eq!(index.find_project_for_path("/etc/passwd"), None);
    }

    #[test]
    fn test_duplicate_roots_later_wins() {
        let index = index(&[("first", "libs/a"), ("second", "libs/a/")]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.find_project_for_path("libs/a/src"), Some("second"));
        assert_eq!(index.root_of("second"), Some("libs/a"));
        assert_eq!(index.root_of("first"), None);
    }

    #[test]
    fn test_accessors() {
        let index = index(&[("b", "libs/b"), ("a", "libs/a")]);
        assert!(!index.is_empty());
        assert_eq!(index.roots(), vec!["libs/a", "libs/b"]);
        assert_eq!(index.installed_dir(), "node_modules");
        assert!(ProjectRootIndex::new(&[], "node_modules").is_empty());
    }

    proptest! {
        #[test]
        fn installed_dir_paths_never_match(prefix in "[a-z]{1,6}(/[a-z]{1,6}){0,3}", rest in "[a-z]{1,6}(/[a-z]{1,6}){0,2}") {
            let index = index(&[("workspace", "."), ("lib", prefix.as_str())]);
            let path = format!("{}/node_modules/{}", prefix, rest);
            prop_assert_eq!(index.find_project_for_path(&path), None);
        }
    }
}
