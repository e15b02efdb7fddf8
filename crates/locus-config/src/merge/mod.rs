//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;
use std::sync::Arc;
use camino::Utf8PathBuf;
use locus_core::error::LocusError;
use locus_core::fs::FileSystem;
use tracing::debug;
use crate::{ConfigResult, toml::LocusToml};

/// Name of the settings file
pub const CONFIG_FILE_NAME: &str = "locus.toml";

/// Prefix shared by all environment overrides
const ENV_PREFIX: &str = "LOCUS_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Directory the search starts from
    cwd: Utf8PathBuf,
    fs: Arc<dyn FileSystem>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// A locus.toml file
    File(Utf8PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { cwd, fs }
    }

    /// Load the nearest locus.toml, falling back to defaults
    pub fn load_project_config(&self) -> ConfigResult<(LocusToml, ConfigSource)> {
        match self.resolve_config_path(CONFIG_FILE_NAME) {
            Some(path) => {
                debug!("Loading settings from {}", path);
                let config = crate::toml::load_from_file(self.fs.as_ref(), &path)?;
                Ok((config, ConfigSource::File(path)))
            },
            None => {
                debug!("No {} found above {}, using defaults", CONFIG_FILE_NAME, self.cwd);
                Ok((LocusToml::default(), ConfigSource::Defaults))
            },
        }
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(filename);
            if self.fs.is_file(&config_path) {
                return Some(config_path);
            }

            // Move up one directory
            current = dir.parent();
        }

        None
    }

    /// Load, then apply environment and CLI overrides
    pub fn load_layered(
        &self,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<(LocusToml, ConfigSource)> {
        let (project, source) = self.load_project_config()?;
        let merged = ConfigLayering::merge_configs(
            project,
            ConfigLayering::collect_env_overrides(),
            cli_overrides,
        )?;
        Ok((merged, source))
    }
}

impl ConfigLayering {
    /// Merge configuration layers: file < environment < command line
    pub fn merge_configs(
        project_config: LocusToml,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<LocusToml> {
        let mut merged = project_config;

        // Apply environment variable overrides
        for (key, value) in &env_overrides {
            match key.strip_prefix(ENV_PREFIX) {
                Some(setting) => Self::apply_override(&mut merged, key, &setting.to_lowercase().replace('_', "-"), value)?,
                None => {
                    // Not ours, ignore
                },
            }
        }

        // Apply CLI flag overrides (highest priority)
        for (key, value) in &cli_overrides {
            Self::apply_override(&mut merged, key, key, value)?;
        }

        crate::toml::validate_config(&merged)?;
        Ok(merged)
    }

    /// Apply one override; `origin` is the key as the user wrote it
    fn apply_override(config: &mut LocusToml, origin: &str, setting: &str, value: &str) -> ConfigResult<()> {
        let resolver = &mut config.resolver;
        match setting {
            "installed-dir" => {
                resolver.installed_dir = value.to_string();
            },
            "tsconfig" | "tsconfig-files" => {
                resolver.tsconfig_files = split_list(value);
            },
            "extra-builtins" => {
                resolver.extra_builtins = split_list(value);
            },
            "language-fallback" => {
                resolver.language_fallback = parse_flag(origin, value)?;
            },
            "runtime-fallback" => {
                resolver.runtime_fallback = parse_flag(origin, value)?;
            },
            _ => {
                debug!("Ignoring unknown setting override '{}'", origin);
            },
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        Self::collect_overrides_from(std::env::vars())
    }

    /// Keep only the `LOCUS_*` variables from an environment listing
    pub fn collect_overrides_from(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> HashMap<String, String> {
        vars.into_iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(origin: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LocusError::ConfigValidation {
            field: origin.to_string(),
            reason: format!("Expected a boolean, got '{}'", other),
        }),
    }
}
