//! Import records and inferred dependency edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a dependency was expressed in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// `import ... from` / `require()` evaluated at load time
    Static,
    /// `import()` expression with a literal specifier
    Dynamic,
}

/// One literal import found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Name of the project owning `file`
    pub source: String,
    /// Workspace-relative path of the importing file
    pub file: String,
    /// The literal module specifier
    pub specifier: String,
    #[serde(default = "default_kind")]
    pub kind: EdgeKind,
}

fn default_kind() -> EdgeKind {
    EdgeKind::Static
}

/// A dependency edge between two graph nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InferredEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl ImportRecord {
    /// Create a static import record
    pub fn new(
        source: impl Into<String>,
        file: impl Into<String>,
        specifier: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            file: file.into(),
            specifier: specifier.into(),
            kind: EdgeKind::Static,
        }
    }

    /// Mark this record as a dynamic import
    pub fn dynamic(mut self) -> Self {
        self.kind = EdgeKind::Dynamic;
        self
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Static => write!(f, "static"),
            EdgeKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl fmt::Display for InferredEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.kind)
    }
}
