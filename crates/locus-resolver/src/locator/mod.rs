//! Resolution orchestrator
//!
//! [`TargetProjectLocator`] owns every cache and collaborator for one
//! project-graph build. It runs the strategies in [`STRATEGY_ORDER`] and
//! memoizes the first terminal outcome per (specifier, context project root).
//! Collaborator failures never escape `resolve`; they only make a strategy
//! fall through.

use std::collections::HashMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use locus_config::toml::ResolverSection;
use locus_config::tsconfig::{CompilerConfig, CompilerConfigLoader, TsConfigLoader};
use locus_core::fs::{FileSystem, OsFileSystem};
use locus_core::types::{ExternalNode, ProjectNode, WorkspaceGraph};
use locus_core::utils::{
    dirname, has_segment, is_relative_specifier, join_path, normalize_path, normalize_utf8,
    relative_to,
};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::builtins::BuiltinModules;
use crate::cache::{Resolution, ResolutionCache, ResolverStats};
use crate::descriptor::DescriptorCache;
use crate::external::{parse_package_name, ExternalResolver, NodeModulesLocator, PackageLocator};
use crate::fallback::{ModuleResolver, NodeModuleResolver, TypeScriptModuleResolver};
use crate::mapping::PathMappingTable;
use crate::roots::ProjectRootIndex;
use crate::strategy::{Attempt, StrategyKind, STRATEGY_ORDER};

/// Where a resolution outcome came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceSource {
    /// Answered from the (specifier, context) cache
    Cache,
    /// Decided by this strategy
    Strategy(StrategyKind),
    /// Every strategy fell through
    Exhausted,
}

impl std::fmt::Display for TraceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceSource::Cache => f.write_str("cache"),
            TraceSource::Strategy(kind) => write!(f, "{}", kind),
            TraceSource::Exhausted => f.write_str("exhausted"),
        }
    }
}

/// A resolution together with how it was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// Resolved node id, if any
    pub result: Option<String>,
    /// How the result was obtained
    pub source: TraceSource,
}

/// Compiler configuration and everything derived from it
struct CompilerState {
    config: Arc<CompilerConfig>,
    table: PathMappingTable,
    language: Arc<dyn ModuleResolver>,
}

/// Maps import specifiers to project and external node ids
pub struct TargetProjectLocator {
    workspace_root: Utf8PathBuf,
    settings: ResolverSection,
    projects: Vec<ProjectNode>,
    /// Project name -> normalized root
    project_roots: HashMap<String, String>,
    /// Declared package name -> project name
    package_names: HashMap<String, String>,
    index: ProjectRootIndex,
    builtins: BuiltinModules,
    external: ExternalResolver,
    descriptors: Arc<DescriptorCache>,
    compiler_loader: Arc<dyn CompilerConfigLoader>,
    compiler: OnceCell<Option<CompilerState>>,
    language_override: Option<Arc<dyn ModuleResolver>>,
    runtime: Arc<dyn ModuleResolver>,
    cache: ResolutionCache,
}

impl TargetProjectLocator {
    /// Start building a locator for the workspace at `workspace_root`
    pub fn builder(workspace_root: impl Into<Utf8PathBuf>) -> LocatorBuilder {
        LocatorBuilder::new(workspace_root)
    }

    /// Resolve `specifier` imported by `importing_file` in the project rooted
    /// at `context_root`
    ///
    /// Both paths are workspace-relative. The outcome, including "no match",
    /// is memoized; repeated calls return the same answer without touching
    /// any collaborator.
    pub fn resolve(&self, specifier: &str, context_root: &str, importing_file: &str) -> Option<String> {
        self.resolve_with_trace(specifier, context_root, importing_file).result
    }

    /// Like [`resolve`](Self::resolve), also reporting which strategy decided
    pub fn resolve_with_trace(&self, specifier: &str, context_root: &str, importing_file: &str) -> Trace {
        let importing_file = normalize_path(importing_file.strip_prefix("./").unwrap_or(importing_file));
        let context = normalize_path(context_root);
        let key = self.cache_key(specifier, &importing_file);

        if let Some(hit) = self.cache.get(&key, &context) {
            return Trace {
                result: hit.into_option(),
                source: TraceSource::Cache,
            };
        }

        let (resolution, source) = self.run_strategies(specifier, &context, &importing_file);
        let stored = self.cache.insert(&key, &context, resolution);

        Trace {
            result: stored.into_option(),
            source,
        }
    }

    /// Candidate targets the compiler alias table gives for `specifier`
    pub fn expand_path_mapping(&self, specifier: &str) -> Option<Vec<String>> {
        self.compiler()?.table.expand(specifier)
    }

    /// Hit/miss counters of every cache
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            imports: self.cache.stats(),
            packages: self.external.stats(),
            descriptors: self.descriptors.stats(),
            compiler_config_loaded: self.compiler.get().is_some(),
        }
    }

    /// Normalized root of a project
    pub fn project_root(&self, project: &str) -> Option<&str> {
        self.project_roots.get(project).map(String::as_str)
    }

    /// Project nodes, construction order
    pub fn projects(&self) -> &[ProjectNode] {
        &self.projects
    }

    /// External nodes, construction order
    pub fn externals(&self) -> &[ExternalNode] {
        self.external.externals()
    }

    /// Absolute workspace root
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// Effective settings
    pub fn settings(&self) -> &ResolverSection {
        &self.settings
    }

    /// Project root index
    pub fn root_index(&self) -> &ProjectRootIndex {
        &self.index
    }

    /// Relative specifiers depend on the importing directory, not just the project
    fn cache_key(&self, specifier: &str, importing_file: &str) -> String {
        if is_relative_specifier(specifier) {
            format!("./{}", join_path(&dirname(importing_file), specifier))
        } else {
            specifier.to_string()
        }
    }

    fn run_strategies(&self, specifier: &str, context: &str, importing_file: &str) -> (Resolution, TraceSource) {
        for kind in STRATEGY_ORDER {
            let attempt = self.attempt(kind, specifier, context, importing_file);
            trace!("{} '{}' from {}: {:?}", kind, specifier, importing_file, attempt);

            match attempt {
                Attempt::Resolved(id) => return (Resolution::Resolved(id), TraceSource::Strategy(kind)),
                Attempt::Rejected => return (Resolution::NoMatch, TraceSource::Strategy(kind)),
                Attempt::Skipped => {},
            }
        }

        (Resolution::NoMatch, TraceSource::Exhausted)
    }

    fn attempt(&self, kind: StrategyKind, specifier: &str, context: &str, importing_file: &str) -> Attempt {
        match kind {
            StrategyKind::Relative => self.resolve_relative(specifier, importing_file),
            StrategyKind::PathMapping => self.resolve_path_mapping(specifier),
            StrategyKind::Builtin => {
                if self.builtins.is_builtin(specifier) {
                    Attempt::Rejected
                } else {
                    Attempt::Skipped
                }
            },
            StrategyKind::External => Attempt::from_option(self.external.resolve(specifier, context)),
            StrategyKind::LanguageFallback => self.resolve_with_language(specifier, importing_file),
            StrategyKind::WorkspacePackage => Attempt::from_option(
                self.package_names.get(parse_package_name(specifier)).cloned(),
            ),
            StrategyKind::RuntimeFallback => {
                if !self.settings.runtime_fallback {
                    return Attempt::Skipped;
                }
                self.resolve_with(self.runtime.as_ref(), specifier, importing_file)
            },
        }
    }

    fn resolve_relative(&self, specifier: &str, importing_file: &str) -> Attempt {
        if !is_relative_specifier(specifier) {
            return Attempt::Skipped;
        }

        let joined = join_path(&dirname(importing_file), specifier);
        if has_segment(&joined, &self.settings.installed_dir) {
            return Attempt::Rejected;
        }

        match self.index.find_project_for_path(&joined) {
            Some(project) => Attempt::Resolved(project.to_string()),
            None => Attempt::Rejected,
        }
    }

    fn resolve_path_mapping(&self, specifier: &str) -> Attempt {
        let Some(state) = self.compiler() else {
            return Attempt::Skipped;
        };
        let Some(candidates) = state.table.expand(specifier) else {
            return Attempt::Skipped;
        };

        candidates
            .iter()
            .filter_map(|target| {
                let absolute = normalize_utf8(&state.config.paths_base.join(target));
                relative_to(&self.workspace_root, &absolute)
            })
            .find_map(|target| self.index.find_project_for_path(&target).map(str::to_string))
            .map_or(Attempt::Skipped, Attempt::Resolved)
    }

    fn resolve_with_language(&self, specifier: &str, importing_file: &str) -> Attempt {
        if !self.settings.language_fallback {
            return Attempt::Skipped;
        }
        match self.compiler() {
            Some(state) if state.config.has_paths() => {
                self.resolve_with(state.language.as_ref(), specifier, importing_file)
            },
            _ => Attempt::Skipped,
        }
    }

    /// Run a module resolver and map the file it finds back to a project
    fn resolve_with(&self, resolver: &dyn ModuleResolver, specifier: &str, importing_file: &str) -> Attempt {
        let absolute_file = self.workspace_root.join(importing_file);

        match resolver.resolve(specifier, &absolute_file) {
            Ok(resolved) => Attempt::from_option(self.project_of_resolved(&resolved)),
            Err(e) => {
                debug!("Fallback resolution of '{}' failed: {}", specifier, e);
                Attempt::Skipped
            },
        }
    }

    /// Project enclosing an absolute resolved path, unless it is installed
    fn project_of_resolved(&self, resolved: &Utf8Path) -> Option<String> {
        let relative = relative_to(&self.workspace_root, resolved)?;
        if has_segment(&relative, &self.settings.installed_dir) {
            return None;
        }
        self.index.find_project_for_path(&relative).map(str::to_string)
    }

    /// Load the compiler configuration on first use
    fn compiler(&self) -> Option<&CompilerState> {
        self.compiler
            .get_or_init(|| match self.compiler_loader.load() {
                Ok(Some(config)) => Some(self.compiler_state(config)),
                Ok(None) => None,
                Err(e) => {
                    warn!("Ignoring compiler configuration: {}", e);
                    None
                },
            })
            .as_ref()
    }

    fn compiler_state(&self, config: CompilerConfig) -> CompilerState {
        debug!(
            "Compiler configuration {} declares {} path aliases",
            config.path,
            config.paths.len()
        );
        let config = Arc::new(config);
        let language = match &self.language_override {
            Some(resolver) => Arc::clone(resolver),
            None => Arc::new(TypeScriptModuleResolver::new(
                Arc::clone(&self.descriptors),
                Arc::clone(&config),
                self.settings.installed_dir.clone(),
            )),
        };

        CompilerState {
            table: PathMappingTable::new(config.paths.clone()),
            config,
            language,
        }
    }
}

impl std::fmt::Debug for TargetProjectLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetProjectLocator")
            .field("workspace_root", &self.workspace_root)
            .field("projects", &self.projects.len())
            .field("externals", &self.external.externals().len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Builder for [`TargetProjectLocator`]
///
/// Every collaborator has a default backed by the real filesystem; tests
/// inject their own.
pub struct LocatorBuilder {
    workspace_root: Utf8PathBuf,
    projects: Vec<ProjectNode>,
    externals: Vec<ExternalNode>,
    settings: ResolverSection,
    fs: Option<Arc<dyn FileSystem>>,
    compiler_loader: Option<Arc<dyn CompilerConfigLoader>>,
    package_locator: Option<Arc<dyn PackageLocator>>,
    language_resolver: Option<Arc<dyn ModuleResolver>>,
    runtime_resolver: Option<Arc<dyn ModuleResolver>>,
}

impl LocatorBuilder {
    /// Create a builder with default settings and no nodes
    pub fn new(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            projects: Vec::new(),
            externals: Vec::new(),
            settings: ResolverSection::default(),
            fs: None,
            compiler_loader: None,
            package_locator: None,
            language_resolver: None,
            runtime_resolver: None,
        }
    }

    /// Workspace projects
    pub fn projects(mut self, projects: Vec<ProjectNode>) -> Self {
        self.projects = projects;
        self
    }

    /// Known external nodes
    pub fn externals(mut self, externals: Vec<ExternalNode>) -> Self {
        self.externals = externals;
        self
    }

    /// Projects and externals from a serialized workspace graph
    pub fn graph(self, graph: WorkspaceGraph) -> Self {
        self.projects(graph.projects).externals(graph.externals)
    }

    /// Resolver settings
    pub fn settings(mut self, settings: ResolverSection) -> Self {
        self.settings = settings;
        self
    }

    /// Filesystem every default collaborator reads through
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Compiler configuration source
    pub fn compiler_config_loader(mut self, loader: Arc<dyn CompilerConfigLoader>) -> Self {
        self.compiler_loader = Some(loader);
        self
    }

    /// Installed package locator
    pub fn package_locator(mut self, locator: Arc<dyn PackageLocator>) -> Self {
        self.package_locator = Some(locator);
        self
    }

    /// Compiler-aware fallback resolver
    pub fn language_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.language_resolver = Some(resolver);
        self
    }

    /// Runtime fallback resolver
    pub fn runtime_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.runtime_resolver = Some(resolver);
        self
    }

    /// Build the locator
    pub fn build(self) -> TargetProjectLocator {
        let workspace_root = normalize_utf8(&self.workspace_root);
        let settings = self.settings;
        let fs: Arc<dyn FileSystem> = self.fs.unwrap_or_else(|| Arc::new(OsFileSystem));
        let descriptors = Arc::new(DescriptorCache::new(Arc::clone(&fs)));

        let compiler_loader = self.compiler_loader.unwrap_or_else(|| {
            Arc::new(
                TsConfigLoader::new(Arc::clone(&fs), workspace_root.clone())
                    .with_file_names(settings.tsconfig_files.clone())
                    .with_installed_dir(settings.installed_dir.clone()),
            )
        });
        let package_locator = self.package_locator.unwrap_or_else(|| {
            Arc::new(NodeModulesLocator::new(Arc::clone(&fs), settings.installed_dir.clone()))
        });
        let runtime = self.runtime_resolver.unwrap_or_else(|| {
            Arc::new(NodeModuleResolver::new(
                Arc::clone(&descriptors),
                settings.installed_dir.clone(),
            ))
        });

        let index = ProjectRootIndex::new(&self.projects, settings.installed_dir.clone());
        let project_roots = self
            .projects
            .iter()
            .map(|project| (project.name.clone(), normalize_path(&project.root)))
            .collect();

        let mut package_names: HashMap<String, String> = HashMap::new();
        for project in &self.projects {
            let Some(package_name) = &project.metadata.package_name else {
                continue;
            };
            if let Some(existing) = package_names.get(package_name) {
                warn!(
                    "Projects '{}' and '{}' both declare package '{}'; using '{}'",
                    existing, project.name, package_name, existing
                );
                continue;
            }
            package_names.insert(package_name.clone(), project.name.clone());
        }

        let external = ExternalResolver::new(
            workspace_root.clone(),
            self.externals,
            package_locator,
            Arc::clone(&descriptors),
        );

        debug!(
            "Locator for {} with {} projects and {} externals",
            workspace_root,
            self.projects.len(),
            external.externals().len()
        );

        TargetProjectLocator {
            workspace_root,
            builtins: BuiltinModules::new(settings.extra_builtins.iter().cloned()),
            settings,
            projects: self.projects,
            project_roots,
            package_names,
            index,
            external,
            descriptors,
            compiler_loader,
            compiler: OnceCell::new(),
            language_override: self.language_resolver,
            runtime,
            cache: ResolutionCache::new(),
        }
    }
}
