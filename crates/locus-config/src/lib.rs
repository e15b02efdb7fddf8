//! Configuration parsing for the Locus import resolver
//!
//! This crate reads the three kinds of files resolution depends on:
//! installed package descriptors (package.json), the workspace compiler
//! configuration (tsconfig.json with its `extends` chain), and the resolver's
//! own settings (locus.toml layered with environment and CLI overrides).

pub mod json;
pub mod merge;
pub mod toml;
pub mod tsconfig;

// Re-export main types
pub use json::{parse_package_json, read_package_json, PackageJson};
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use self::toml::{LocusToml, ResolverSection};
pub use tsconfig::{CompilerConfig, CompilerConfigLoader, TsConfig, TsConfigLoader};

use locus_core::error::LocusError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, LocusError>;
