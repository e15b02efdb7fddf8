//! Command implementations and dispatch logic.
//!
//! Each command has a `run` function producing a serializable report and an
//! `execute` function that loads what it needs and prints the report.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use camino::{Utf8Path, Utf8PathBuf};
use locus_config::merge::CONFIG_FILE_NAME;
use locus_config::{CompilerConfig, CompilerConfigLoader, ConfigLoader, ConfigSource, LocusToml, ResolverSection, TsConfigLoader};
use locus_core::error::{LocusError, LocusResult};
use locus_core::fs::{FileSystem, OsFileSystem};
use locus_core::types::WorkspaceGraph;
use locus_resolver::TargetProjectLocator;
use tracing::{debug, info};

pub mod check;
pub mod edges;
pub mod paths;
pub mod resolve;


use crate::{output::OutputHandler, Cli, Commands};

/// Shared context for all commands
pub struct CommandContext {
    /// Absolute workspace root
    pub root: Utf8PathBuf,
    /// Absolute path of the serialized workspace graph
    pub graph: Utf8PathBuf,
    /// Settings given as command-line flags
    pub overrides: HashMap<String, String>,
    pub json: bool,
    pub output: OutputHandler,
    pub fs: Arc<dyn FileSystem>,
}

impl CommandContext {
    /// Context for a workspace root and graph file
    pub fn new(root: Utf8PathBuf, graph: impl AsRef<Utf8Path>) -> Self {
        let graph = root.join(graph.as_ref());
        Self {
            root,
            graph,
            overrides: HashMap::new(),
            json: false,
            output: OutputHandler::new(),
            fs: Arc::new(OsFileSystem),
        }
    }

    /// Build the context from parsed arguments
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = utf8_path(std::env::current_dir().context("Failed to get current directory")?)?;
        let fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem);

        let root = match &cli.root {
            Some(root) => cwd.join(utf8_path(root.clone())?),
            None => workspace_root_for(&cwd, Arc::clone(&fs)),
        };
        debug!("Workspace root: {}", root);

        let mut ctx = Self::new(root, utf8_path(cli.graph.clone())?);
        ctx.overrides = cli_overrides(cli);
        ctx.json = cli.json;
        ctx.fs = fs;
        Ok(ctx)
    }

    /// Layered settings: locus.toml < `LOCUS_*` environment < flags
    pub fn settings(&self) -> anyhow::Result<(LocusToml, ConfigSource)> {
        ConfigLoader::new(self.root.clone(), Arc::clone(&self.fs))
            .load_layered(self.overrides.clone())
            .context("Failed to load settings")
    }

    /// Parse the serialized workspace graph
    pub fn load_graph(&self) -> anyhow::Result<WorkspaceGraph> {
        let content = self
            .fs
            .read_to_string(&self.graph)
            .with_context(|| format!("Failed to read workspace graph {}", self.graph))?;
        let graph = WorkspaceGraph::from_json(&content).map_err(|e| LocusError::json(self.graph.as_str(), e))?;
        info!(
            "Loaded {} projects and {} externals from {}",
            graph.projects.len(),
            graph.externals.len(),
            self.graph
        );
        Ok(graph)
    }

    /// Locator over the workspace graph with the effective settings
    pub fn load_locator(&self) -> anyhow::Result<TargetProjectLocator> {
        let (settings, _) = self.settings()?;
        let graph = self.load_graph()?;

        Ok(TargetProjectLocator::builder(self.root.clone())
            .graph(graph)
            .settings(settings.resolver)
            .file_system(Arc::clone(&self.fs))
            .build())
    }

    /// Compiler configuration the resolver would see
    pub fn compiler_config(&self, settings: &ResolverSection) -> LocusResult<Option<CompilerConfig>> {
        TsConfigLoader::new(Arc::clone(&self.fs), self.root.clone())
            .with_file_names(settings.tsconfig_files.clone())
            .with_installed_dir(settings.installed_dir.clone())
            .load()
    }

    /// Resolve a user-supplied path against the current directory
    pub fn input_path(&self, path: &Path) -> anyhow::Result<Utf8PathBuf> {
        let path = utf8_path(path.to_path_buf())?;
        if path.is_absolute() {
            return Ok(path);
        }
        let cwd = utf8_path(std::env::current_dir().context("Failed to get current directory")?)?;
        Ok(cwd.join(path))
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { specifier, from, project } => {
            info!("Resolving '{}' from {}", specifier, from);
            resolve::execute(&specifier, &from, project.as_deref(), ctx)
        },
        Commands::Edges { imports, parallel, stats } => {
            info!("Inferring edges from {} (parallel: {})", imports.display(), parallel);
            edges::execute(&imports, parallel, stats, ctx)
        },
        Commands::Paths { specifier } => paths::execute(&specifier, ctx),
        Commands::Check => {
            info!("Checking workspace at {}", ctx.root);
            check::execute(ctx)
        },
    }
}

/// Directory holding the nearest locus.toml, else `cwd`
pub fn workspace_root_for(cwd: &Utf8Path, fs: Arc<dyn FileSystem>) -> Utf8PathBuf {
    ConfigLoader::new(cwd.to_path_buf(), fs)
        .resolve_config_path(CONFIG_FILE_NAME)
        .and_then(|path| path.parent().map(Utf8Path::to_path_buf))
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Settings given as flags, keyed the way `locus.toml` spells them
pub fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if let Some(dir) = &cli.installed_dir {
        overrides.insert("installed-dir".to_string(), dir.clone());
    }
    if let Some(files) = &cli.tsconfig {
        overrides.insert("tsconfig-files".to_string(), files.clone());
    }
    if cli.no_language_fallback {
        overrides.insert("language-fallback".to_string(), "false".to_string());
    }
    if cli.no_runtime_fallback {
        overrides.insert("runtime-fallback".to_string(), "false".to_string());
    }
    overrides
}

fn utf8_path(path: PathBuf) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| anyhow!("Path is not valid UTF-8: {}", path.display()))
}
