//! Core data types for the workspace graph.
//!
//! This module provides the fundamental types used throughout Locus:
//! - Internal project nodes and external package nodes
//! - The serialized workspace graph the resolver is built from
//! - Import records and the dependency edges inferred from them

pub mod dependency;
pub mod node;

// Re-export all public types
pub use dependency::{EdgeKind, ImportRecord, InferredEdge};
pub use node::{ExternalNode, ProjectMetadata, ProjectNode, WorkspaceGraph};
