//! `locus resolve` command implementation.

use anyhow::anyhow;
use locus_resolver::{TargetProjectLocator, TraceSource};
use serde::Serialize;

use super::CommandContext;

/// Outcome of resolving one specifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveReport {
    pub specifier: String,
    pub from: String,
    /// Project the importing file belongs to
    pub project: String,
    pub result: Option<String>,
    pub source: TraceSource,
}

/// Resolve `specifier` from `from`, inferring the owning project when not given
pub fn run(
    locator: &TargetProjectLocator,
    specifier: &str,
    from: &str,
    project: Option<&str>,
) -> anyhow::Result<ResolveReport> {
    let from = from.strip_prefix("./").unwrap_or(from);

    let project = match project {
        Some(project) => project.to_string(),
        None => locator
            .root_index()
            .find_project_for_path(from)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("'{}' is not inside any project; pass --project", from))?,
    };
    let root = locator
        .project_root(&project)
        .ok_or_else(|| anyhow!("Unknown project '{}'", project))?;

    let trace = locator.resolve_with_trace(specifier, root, from);

    Ok(ResolveReport {
        specifier: specifier.to_string(),
        from: from.to_string(),
        project,
        result: trace.result,
        source: trace.source,
    })
}

/// Execute the `locus resolve` command
pub fn execute(specifier: &str, from: &str, project: Option<&str>, ctx: &CommandContext) -> anyhow::Result<()> {
    let locator = ctx.load_locator()?;
    let report = run(&locator, specifier, from, project)?;

    if ctx.json {
        return ctx.output.json(&report);
    }

    let colors = ctx.output.colors();
    let target = match &report.result {
        Some(id) => colors.green(id),
        None => colors.yellow("no match"),
    };
    ctx.output.line(&format!(
        "{} -> {} {}",
        report.specifier,
        target,
        colors.dim(&format!("({})", report.source))
    ));
    Ok(())
}
