//! Utility functions and helpers.
//!
//! Common functionality used across multiple Locus crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{
    dirname, escapes_root, has_segment, is_relative_specifier, join_path, normalize_path,
    normalize_utf8, relative_to,
};
