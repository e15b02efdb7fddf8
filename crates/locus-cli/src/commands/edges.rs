//! `locus edges` command implementation.
//!
//! Reads a JSON array of import records and prints the inferred project
//! dependency edges, warning when they form a cycle.

use std::path::Path;
use std::time::Instant;

use locus_core::error::LocusError;
use locus_core::types::{ImportRecord, InferredEdge};
use locus_resolver::{format_cycle, infer_edges, infer_edges_parallel, ResolverStats, TargetProjectLocator};
use serde::Serialize;
use tracing::debug;

use super::CommandContext;

#[derive(Debug, Clone, Serialize)]
pub struct EdgesReport {
    pub edges: Vec<InferredEdge>,
    /// One dependency cycle among the edges, if any
    pub cycle: Option<Vec<String>>,
    pub stats: ResolverStats,
}

/// Infer edges for `imports`
pub fn run(locator: &TargetProjectLocator, imports: &[ImportRecord], parallel: bool) -> EdgesReport {
    let graph = if parallel {
        infer_edges_parallel(locator, imports)
    } else {
        infer_edges(locator, imports)
    };

    EdgesReport {
        edges: graph.edges(),
        cycle: graph.find_cycle(),
        stats: locator.stats(),
    }
}

/// Parse a JSON array of import records
pub fn load_imports(ctx: &CommandContext, path: &camino::Utf8Path) -> anyhow::Result<Vec<ImportRecord>> {
    let content = ctx.fs.read_to_string(path)?;
    let imports: Vec<ImportRecord> =
        serde_json::from_str(&content).map_err(|e| LocusError::json(path.as_str(), e))?;
    Ok(imports)
}

/// Execute the `locus edges` command
pub fn execute(imports: &Path, parallel: bool, show_stats: bool, ctx: &CommandContext) -> anyhow::Result<()> {
    let locator = ctx.load_locator()?;
    let imports = load_imports(ctx, &ctx.input_path(imports)?)?;

    let start = Instant::now();
    let report = run(&locator, &imports, parallel);
    debug!(
        "Resolved {} records in {:.2}ms",
        imports.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if ctx.json {
        return ctx.output.json(&report);
    }

    for edge in &report.edges {
        ctx.output.line(&edge.to_string());
    }
    if let Some(cycle) = &report.cycle {
        ctx.output.warn(&format!("Dependency cycle: {}", format_cycle(cycle)));
    }
    if show_stats {
        let stats = &report.stats;
        ctx.output.info(&format!(
            "imports: {} entries, {:.0}% hits; packages: {} entries; descriptors: {} read",
            stats.imports.entries,
            stats.imports.hit_rate() * 100.0,
            stats.packages.entries,
            stats.descriptors.entries,
        ));
    }
    ctx.output.success(&format!(
        "{} edges from {} import records",
        report.edges.len(),
        imports.len()
    ));
    Ok(())
}
