//! Workspace node types.
//!
//! Nodes are supplied by the caller once per graph build and are treated as
//! immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An internal, buildable unit of the workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    /// Unique project name
    pub name: String,
    /// Workspace-relative root directory
    pub root: String,
    /// Opaque metadata carried through from discovery
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

/// Project metadata
///
/// Only `package_name` is interpreted by the resolver; everything else is
/// carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// `name` declared by the project's own package.json, if any
    #[serde(default, rename = "packageName", skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Anything else discovery attached
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// An installed, non-workspace dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalNode {
    /// Graph identifier (e.g. "npm:left-pad@1.2.0")
    pub name: String,
    /// Declared package name
    #[serde(rename = "packageName")]
    pub package_name: String,
    /// Declared package version
    pub version: String,
}

/// Construction input for a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceGraph {
    #[serde(default)]
    pub projects: Vec<ProjectNode>,
    #[serde(default)]
    pub externals: Vec<ExternalNode>,
}

impl ProjectNode {
    /// Create a project node with empty metadata
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            metadata: ProjectMetadata::default(),
        }
    }

    /// Attach the package name declared by the project's package.json
    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.metadata.package_name = Some(package_name.into());
        self
    }
}

impl ExternalNode {
    /// Create an external node using the conventional `npm:<name>@<version>` id
    pub fn npm(package_name: impl Into<String>, version: impl Into<String>) -> Self {
        let package_name = package_name.into();
        let version = version.into();
        Self {
            name: format!("npm:{}@{}", package_name, version),
            package_name,
            version,
        }
    }

    /// Check whether this node describes the given installed package
    pub fn matches(&self, package_name: &str, version: &str) -> bool {
        self.package_name == package_name && self.version == version
    }
}

impl WorkspaceGraph {
    /// Parse a workspace graph from JSON
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// External nodes sharing a (package name, version) pair with an earlier node
    pub fn duplicate_externals(&self) -> Vec<&ExternalNode> {
        let mut seen = HashSet::new();
        self.externals
            .iter()
            .filter(|node| !seen.insert((node.package_name.as_str(), node.version.as_str())))
            .collect()
    }

    /// Look up a project by name
    pub fn project(&self, name: &str) -> Option<&ProjectNode> {
        self.projects.iter().find(|p| p.name == name)
    }
}
