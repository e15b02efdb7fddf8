//! Import resolution engine for monorepo project graphs
//!
//! Maps the module specifier of an import or require expression to the
//! workspace project or installed external package it refers to, and turns
//! batches of such imports into a deduplicated project dependency graph.
//!
//! [`TargetProjectLocator`] is the entry point. It runs a fixed sequence of
//! strategies (relative paths, compiler path aliases, builtin detection,
//! installed packages, then full module resolution as a fallback) and
//! memoizes every outcome, including "no match".

pub mod builtins;
pub mod cache;
pub mod descriptor;
pub mod external;
pub mod fallback;
pub mod graph;
pub mod locator;
pub mod mapping;
pub mod roots;
pub mod strategy;

// Re-export main types
pub use builtins::BuiltinModules;
pub use cache::{CacheStats, Resolution, ResolutionCache, ResolverStats};
pub use descriptor::DescriptorCache;
pub use external::{parse_package_name, ExternalResolver, NodeModulesLocator, PackageLocator};
pub use fallback::{ModuleResolver, NodeModuleResolver, TypeScriptModuleResolver};
pub use graph::{format_cycle, infer_edges, infer_edges_parallel, InferredGraph};
pub use locator::{LocatorBuilder, TargetProjectLocator, Trace, TraceSource};
pub use mapping::PathMappingTable;
pub use roots::ProjectRootIndex;
pub use strategy::{Attempt, StrategyKind, STRATEGY_ORDER};

use locus_core::error::LocusError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, LocusError>;
