//! locus.toml configuration parsing and serialization

use serde::{Deserialize, Serialize};
use locus_core::error::LocusError;
use locus_core::fs::FileSystem;
use crate::tsconfig::DEFAULT_TSCONFIG_FILES;
use crate::ConfigResult;

/// Complete locus.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocusToml {
    /// Resolver behaviour
    #[serde(default)]
    pub resolver: ResolverSection,
}

/// `[resolver]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverSection {
    /// Installed-dependency directory name
    #[serde(default = "default_installed_dir")]
    pub installed_dir: String,

    /// Compiler configuration file names, searched in order
    #[serde(default = "default_tsconfig_files")]
    pub tsconfig_files: Vec<String>,

    /// Module names treated as builtins in addition to the runtime's own
    #[serde(default)]
    pub extra_builtins: Vec<String>,

    /// Run the compiler-aware fallback resolver
    #[serde(default = "default_true")]
    pub language_fallback: bool,

    /// Run the runtime (require.resolve style) fallback resolver
    #[serde(default = "default_true")]
    pub runtime_fallback: bool,
}

fn default_installed_dir() -> String {
    "node_modules".to_string()
}

fn default_tsconfig_files() -> Vec<String> {
    DEFAULT_TSCONFIG_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            installed_dir: default_installed_dir(),
            tsconfig_files: default_tsconfig_files(),
            extra_builtins: Vec::new(),
            language_fallback: true,
            runtime_fallback: true,
        }
    }
}

/// Parse TOML string to LocusToml configuration
pub fn parse_locus_toml(content: &str) -> ConfigResult<LocusToml> {
    let config: LocusToml = toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_column(content, span.start))
            .unwrap_or((0, 0));
        LocusError::TomlParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Serialize LocusToml to TOML string
pub fn serialize_locus_toml(config: &LocusToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| LocusError::ConfigValidation {
        field: "locus.toml".to_string(),
        reason: format!("TOML serialization error: {}", e),
    })
}

/// Validate configuration completeness
pub fn validate_config(config: &LocusToml) -> ConfigResult<()> {
    let resolver = &config.resolver;

    if resolver.installed_dir.is_empty() || resolver.installed_dir.contains(['/', '\\']) {
        return Err(LocusError::ConfigValidation {
            field: "resolver.installed-dir".to_string(),
            reason: format!(
                "'{}' must be a single directory name",
                resolver.installed_dir
            ),
        });
    }

    if resolver.tsconfig_files.iter().any(|name| name.trim().is_empty()) {
        return Err(LocusError::ConfigValidation {
            field: "resolver.tsconfig-files".to_string(),
            reason: "File names must not be empty".to_string(),
        });
    }

    Ok(())
}

/// Load and parse locus.toml from file path
pub fn load_from_file(fs: &dyn FileSystem, path: &camino::Utf8Path) -> ConfigResult<LocusToml> {
    let content = fs.read_to_string(path)?;

    parse_locus_toml(&content).map_err(|e| match e {
        LocusError::TomlParse { message, line, column } => LocusError::TomlParse {
            message: format!("In file {}: {}", path, message),
            line,
            column,
        },
        other => other,
    })
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    (line, column)
}
