//! `locus paths` command implementation.

use camino::Utf8PathBuf;
use locus_resolver::PathMappingTable;
use serde::Serialize;

use super::CommandContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathsReport {
    pub specifier: String,
    /// Compiler configuration the aliases came from
    pub config: Option<Utf8PathBuf>,
    pub candidates: Option<Vec<String>>,
}

/// Expand `specifier` through the workspace's compiler aliases
pub fn run(ctx: &CommandContext, specifier: &str) -> anyhow::Result<PathsReport> {
    let (settings, _) = ctx.settings()?;
    let config = ctx.compiler_config(&settings.resolver)?;

    let candidates = config
        .as_ref()
        .and_then(|config| PathMappingTable::new(config.paths.clone()).expand(specifier));

    Ok(PathsReport {
        specifier: specifier.to_string(),
        config: config.map(|config| config.path),
        candidates,
    })
}

/// Execute the `locus paths` command
pub fn execute(specifier: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let report = run(ctx, specifier)?;

    if ctx.json {
        return ctx.output.json(&report);
    }

    match (&report.config, &report.candidates) {
        (None, _) => ctx.output.warn("No compiler configuration found"),
        (Some(config), None) => ctx.output.warn(&format!("No alias in {} matches '{}'", config, specifier)),
        (Some(_), Some(candidates)) => {
            for candidate in candidates {
                ctx.output.line(candidate);
            }
        },
    }
    Ok(())
}
