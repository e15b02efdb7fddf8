//! Error types and result aliases for Locus operations.
//!
//! Resolution itself never fails outward: these errors surface from
//! configuration loading and from the collaborators the resolver wraps,
//! where they are downgraded to "no match".

use thiserror::Error;

/// Unified error type for all Locus operations
#[derive(Error, Debug)]
pub enum LocusError {
    // Config errors
    #[error("Failed to parse locus.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse {path}: {message}")]
    JsonParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Circular extends chain detected: {chain}")]
    CircularExtends { chain: String },

    // Resolution errors
    #[error("Package '{name}' not found from {from}")]
    PackageNotFound { name: String, from: String },

    #[error("Module not found: {specifier}")]
    ModuleNotFound { specifier: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Locus operations
pub type LocusResult<T> = Result<T, LocusError>;

impl LocusError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a JSON parse error for a file
    pub fn json(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::JsonParse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error means "nothing there" rather than "something broken"
    pub fn is_not_found(&self) -> bool {
        match self {
            LocusError::PackageNotFound { .. } | LocusError::ModuleNotFound { .. } => true,
            LocusError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            LocusError::TomlParse { .. } | LocusError::ConfigValidation { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            LocusError::TomlParse { .. } => Some("Check locus.toml syntax near the reported line"),
            LocusError::JsonParse { .. } => {
                Some("Check JSON syntax; tsconfig files may contain comments and trailing commas")
            },
            LocusError::CircularExtends { .. } => {
                Some("Remove the circular reference from the tsconfig extends chain")
            },
            LocusError::PackageNotFound { .. } => {
                Some("Install workspace dependencies so node_modules is populated")
            },
            _ => None,
        }
    }
}
