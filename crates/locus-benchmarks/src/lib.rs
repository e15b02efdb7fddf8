//! Locus benchmarking suite
//!
//! Benchmarks for single resolutions, cache hits, alias expansion and
//! edge inference over synthetic in-memory workspaces.

pub mod common;

pub use common::*;
