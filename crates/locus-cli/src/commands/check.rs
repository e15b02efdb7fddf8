//! `locus check` command implementation.
//!
//! Loads every input the resolver depends on and reports problems that
//! would make resolution silently ambiguous.

use std::collections::HashMap;

use anyhow::bail;
use camino::Utf8PathBuf;
use locus_config::{ConfigSource, ResolverSection};
use locus_core::types::WorkspaceGraph;
use locus_core::utils::normalize_path;
use serde::Serialize;

use super::CommandContext;

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// locus.toml in effect, if any
    pub settings_file: Option<Utf8PathBuf>,
    pub settings: ResolverSection,
    pub compiler_config: Option<Utf8PathBuf>,
    pub aliases: usize,
    pub projects: usize,
    pub externals: usize,
    pub problems: Vec<String>,
}

/// Collect ambiguities in a workspace graph
pub fn graph_problems(graph: &WorkspaceGraph) -> Vec<String> {
    let mut problems = Vec::new();

    for external in graph.duplicate_externals() {
        problems.push(format!(
            "External '{}' duplicates {}@{}",
            external.name, external.package_name, external.version
        ));
    }

    let mut roots: HashMap<String, &str> = HashMap::new();
    let mut packages: HashMap<&str, &str> = HashMap::new();
    for project in &graph.projects {
        let root = normalize_path(&project.root);
        if let Some(existing) = roots.insert(root.clone(), &project.name) {
            problems.push(format!(
                "Projects '{}' and '{}' share root '{}'",
                existing, project.name, root
            ));
        }
        if let Some(package_name) = &project.metadata.package_name {
            if let Some(existing) = packages.insert(package_name, &project.name) {
                problems.push(format!(
                    "Projects '{}' and '{}' both declare package '{}'",
                    existing, project.name, package_name
                ));
            }
        }
    }

    problems
}

/// Load settings, compiler configuration and the graph
///
/// Malformed inputs are errors here, unlike during resolution.
pub fn run(ctx: &CommandContext) -> anyhow::Result<CheckReport> {
    let (settings, source) = ctx.settings()?;
    let compiler_config = ctx.compiler_config(&settings.resolver)?;

    let mut problems = Vec::new();
    let (projects, externals) = if ctx.fs.is_file(&ctx.graph) {
        let graph = ctx.load_graph()?;
        problems.extend(graph_problems(&graph));
        (graph.projects.len(), graph.externals.len())
    } else {
        problems.push(format!("Workspace graph {} does not exist", ctx.graph));
        (0, 0)
    };

    Ok(CheckReport {
        settings_file: match source {
            ConfigSource::File(path) => Some(path),
            ConfigSource::Defaults => None,
        },
        settings: settings.resolver,
        aliases: compiler_config.as_ref().map_or(0, |config| config.paths.len()),
        compiler_config: compiler_config.map(|config| config.path),
        projects,
        externals,
        problems,
    })
}

/// Execute the `locus check` command
pub fn execute(ctx: &CommandContext) -> anyhow::Result<()> {
    let report = run(ctx)?;

    if ctx.json {
        ctx.output.json(&report)?;
    } else {
        let settings_file = report
            .settings_file
            .as_ref()
            .map_or_else(|| "defaults".to_string(), |path| path.to_string());
        ctx.output.line(&format!("settings: {}", settings_file));
        match &report.compiler_config {
            Some(path) => ctx.output.line(&format!("compiler config: {} ({} aliases)", path, report.aliases)),
            None => ctx.output.line("compiler config: none"),
        }
        ctx.output.line(&format!(
            "graph: {} projects, {} externals",
            report.projects, report.externals
        ));
        for problem in &report.problems {
            ctx.output.warn(problem);
        }
    }

    if !report.problems.is_empty() {
        bail!("{} problem(s) found", report.problems.len());
    }
    if !ctx.json {
        ctx.output.success("Workspace inputs look consistent");
    }
    Ok(())
}
