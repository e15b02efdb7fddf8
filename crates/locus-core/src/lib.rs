//! # locus-core
//!
//! Core types and utilities shared across all Locus crates.
//!
//! This crate provides:
//! - Workspace node types (`ProjectNode`, `ExternalNode`) and import records
//! - `LocusError` enum for unified error handling
//! - Path normalization helpers used by every resolution strategy
//! - The `FileSystem` seam the resolvers read through
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Workspace graph data types
//! - `error`: Error types and result aliases
//! - `fs`: Filesystem abstraction (real and in-memory)
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod fs;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{LocusError, LocusResult};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use types::{
    EdgeKind, ExternalNode, ImportRecord, InferredEdge, ProjectMetadata, ProjectNode,
    WorkspaceGraph,
};
