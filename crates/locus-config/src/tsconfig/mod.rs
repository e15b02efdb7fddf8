//! Compiler configuration (tsconfig) loading
//!
//! Handles JSONC parsing, `extends` chain resolution, and the alias table the
//! path-mapping strategy consumes. Path targets keep the directory they are
//! relative to, since an inherited `paths` block resolves against the config
//! that declared it, not the one that extends it.

use std::collections::HashSet;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use locus_core::error::LocusError;
use locus_core::fs::FileSystem;
use locus_core::utils::{is_relative_specifier, normalize_utf8};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigResult;

/// Default compiler configuration file names, most specific first
pub const DEFAULT_TSCONFIG_FILES: &[&str] = &["tsconfig.base.json", "tsconfig.json"];

/// Compiler options subset used for module resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Base URL for non-relative module names
    #[serde(rename = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path mapping in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, Vec<String>>>,
}

/// `extends` may name one config or, since TypeScript 5.0, several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    Single(String),
    Multiple(Vec<String>),
}

/// Minimal tsconfig.json representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Extends>,

    #[serde(rename = "compilerOptions", default)]
    pub compiler_options: CompilerOptions,
}

/// The effective configuration after following `extends`
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Absolute path of the config the chain started from
    pub path: Utf8PathBuf,
    /// Absolute base URL, if any config in the chain sets one
    pub base_url: Option<Utf8PathBuf>,
    /// Alias table in declaration order
    pub paths: IndexMap<String, Vec<String>>,
    /// Absolute directory the `paths` targets are relative to
    pub paths_base: Utf8PathBuf,
}

impl CompilerConfig {
    /// Whether an alias table is configured
    pub fn has_paths(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Directory that holds the config file
    pub fn directory(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(Utf8Path::new("/"))
    }
}

/// Loads the compiler configuration governing a workspace
pub trait CompilerConfigLoader: Send + Sync {
    /// Load the nearest enclosing configuration; `Ok(None)` when there is none
    fn load(&self) -> ConfigResult<Option<CompilerConfig>>;
}

/// Finds `tsconfig.base.json` / `tsconfig.json` at or above the workspace root
pub struct TsConfigLoader {
    fs: Arc<dyn FileSystem>,
    workspace_root: Utf8PathBuf,
    file_names: Vec<String>,
    installed_dir: String,
}

impl TsConfigLoader {
    /// Create a loader with the default file names
    pub fn new(fs: Arc<dyn FileSystem>, workspace_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            fs,
            workspace_root: workspace_root.into(),
            file_names: DEFAULT_TSCONFIG_FILES.iter().map(|s| s.to_string()).collect(),
            installed_dir: "node_modules".to_string(),
        }
    }

    /// Override the candidate file names
    pub fn with_file_names(mut self, file_names: Vec<String>) -> Self {
        self.file_names = file_names;
        self
    }

    /// Override the installed-dependency directory used for package `extends`
    pub fn with_installed_dir(mut self, installed_dir: impl Into<String>) -> Self {
        self.installed_dir = installed_dir.into();
        self
    }

    /// Find the nearest config file, walking up from the workspace root
    pub fn find_config_path(&self) -> Option<Utf8PathBuf> {
        let mut current = Some(self.workspace_root.as_path());

        while let Some(dir) = current {
            for name in &self.file_names {
                let candidate = dir.join(name);
                if self.fs.is_file(&candidate) {
                    return Some(candidate);
                }
            }
            current = dir.parent();
        }

        None
    }

    /// Read a config and follow its `extends` chain
    pub fn resolve_chain(&self, path: &Utf8Path) -> ConfigResult<CompilerConfig> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let resolved = self.resolve_recursive(&normalize_utf8(path), &mut visited, &mut chain)?;

        // Targets resolve against baseUrl when the effective config has one
        let config_dir = path.parent().map(normalize_utf8).unwrap_or_default();
        let paths_base = resolved
            .base_url
            .clone()
            .or(resolved.paths_dir)
            .unwrap_or(config_dir);

        Ok(CompilerConfig {
            path: normalize_utf8(path),
            base_url: resolved.base_url,
            paths: resolved.paths.unwrap_or_default(),
            paths_base,
        })
    }

    fn resolve_recursive(
        &self,
        path: &Utf8Path,
        visited: &mut HashSet<Utf8PathBuf>,
        chain: &mut Vec<Utf8PathBuf>,
    ) -> ConfigResult<ResolvedOptions> {
        if !visited.insert(path.to_path_buf()) {
            let mut cycle: Vec<&str> = chain.iter().map(|p| p.as_str()).collect();
            cycle.push(path.as_str());
            return Err(LocusError::CircularExtends {
                chain: cycle.join(" -> "),
            });
        }
        chain.push(path.to_path_buf());

        let config = read_tsconfig(self.fs.as_ref(), path)?;
        let config_dir = path.parent().map(Utf8Path::to_path_buf).unwrap_or_default();

        let mut resolved = ResolvedOptions::default();
        let parents = match &config.extends {
            None => Vec::new(),
            Some(Extends::Single(parent)) => vec![parent.clone()],
            Some(Extends::Multiple(parents)) => parents.clone(),
        };
        for parent in parents {
            let parent_path = self.resolve_extends(&config_dir, &parent).ok_or_else(|| {
                LocusError::ConfigValidation {
                    field: "extends".to_string(),
                    reason: format!("Cannot find '{}' extended by {}", parent, path),
                }
            })?;
            let inherited = self.resolve_recursive(&parent_path, visited, chain)?;
            resolved = resolved.overlay(inherited);
        }

        let own = ResolvedOptions::from_options(&config.compiler_options, &config_dir);
        chain.pop();
        visited.remove(path);
        Ok(resolved.overlay(own))
    }

    /// Locate the file an `extends` value refers to
    fn resolve_extends(&self, config_dir: &Utf8Path, extends: &str) -> Option<Utf8PathBuf> {
        let with_json = |p: Utf8PathBuf| -> Vec<Utf8PathBuf> {
            if p.extension() == Some("json") {
                vec![p]
            } else {
                vec![Utf8PathBuf::from(format!("{}.json", p)), p.join("tsconfig.json"), p]
            }
        };

        let candidates: Vec<Utf8PathBuf> =
            if is_relative_specifier(extends) || Utf8Path::new(extends).is_absolute() {
                with_json(normalize_utf8(&config_dir.join(extends)))
            } else {
                // Package reference: search installed-dependency directories upward
                config_dir
                    .ancestors()
                    .flat_map(|dir| with_json(dir.join(&self.installed_dir).join(extends)))
                    .collect()
            };

        candidates.into_iter().find(|p| self.fs.is_file(p))
    }
}

impl CompilerConfigLoader for TsConfigLoader {
    fn load(&self) -> ConfigResult<Option<CompilerConfig>> {
        let Some(path) = self.find_config_path() else {
            debug!("No compiler configuration found above {}", self.workspace_root);
            return Ok(None);
        };

        debug!("Loading compiler configuration from {}", path);
        self.resolve_chain(&path).map(Some)
    }
}

/// Options with their values already anchored to absolute directories
#[derive(Debug, Default)]
struct ResolvedOptions {
    base_url: Option<Utf8PathBuf>,
    paths: Option<IndexMap<String, Vec<String>>>,
    /// Directory of the config that declared `paths`
    paths_dir: Option<Utf8PathBuf>,
}

impl ResolvedOptions {
    fn from_options(options: &CompilerOptions, config_dir: &Utf8Path) -> Self {
        Self {
            base_url: options
                .base_url
                .as_ref()
                .map(|base| normalize_utf8(&config_dir.join(base))),
            paths: options.paths.clone(),
            paths_dir: options.paths.as_ref().map(|_| config_dir.to_path_buf()),
        }
    }

    /// Apply `child` on top of `self`; set values replace inherited ones wholesale
    fn overlay(self, child: ResolvedOptions) -> Self {
        let (paths, paths_dir) = match child.paths {
            Some(paths) => (Some(paths), child.paths_dir),
            None => (self.paths, self.paths_dir),
        };

        Self {
            base_url: child.base_url.or(self.base_url),
            paths,
            paths_dir,
        }
    }
}

/// JSONC parsing helper using json5 for comment and trailing comma support
pub fn parse_tsconfig(content: &str) -> ConfigResult<TsConfig> {
    json5::from_str(content).map_err(|e| LocusError::json("tsconfig.json", e))
}

/// Read and parse a tsconfig file with JSONC support
pub fn read_tsconfig(fs: &dyn FileSystem, path: &Utf8Path) -> ConfigResult<TsConfig> {
    let content = fs.read_to_string(path)?;

    json5::from_str(&content).map_err(|e| LocusError::json(path.as_str(), e))
}
