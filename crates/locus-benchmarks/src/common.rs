//! Common utilities for benchmarks

use std::sync::Arc;

use criterion::Criterion;
use locus_core::fs::MemoryFileSystem;
use locus_core::types::{ExternalNode, ImportRecord, ProjectNode};
use locus_resolver::TargetProjectLocator;
use pprof::criterion::{Output, PProfProfiler};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// In-memory monorepo with `projects` libraries and as many installed packages
pub struct SyntheticWorkspace {
    pub fs: Arc<MemoryFileSystem>,
    pub projects: Vec<ProjectNode>,
    pub externals: Vec<ExternalNode>,
    pub imports: Vec<ImportRecord>,
}

impl SyntheticWorkspace {
    /// Every library imports its two neighbours by alias, one package, a
    /// builtin and a relative sibling
    pub fn new(projects: usize) -> Self {
        let mut fs = MemoryFileSystem::new().with_file(
            "/ws/tsconfig.base.json",
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@bench/*": ["libs/*/src/index.ts"] } } }"#,
        );
        let mut nodes = Vec::with_capacity(projects);
        let mut externals = Vec::with_capacity(projects);
        let mut imports = Vec::with_capacity(projects * 5);

        for i in 0..projects {
            let name = format!("lib{}", i);
            let root = format!("libs/{}", name);
            let package = format!("pkg-{}", i);

            fs = fs
                .with_file(format!("/ws/{}/src/index.ts", root), "")
                .with_file(
                    format!("/ws/node_modules/{}/package.json", package),
                    format!(r#"{{ "name": "{}", "version": "1.0.{}" }}"#, package, i),
                );
            externals.push(ExternalNode::npm(package.as_str(), format!("1.0.{}", i)));

            let file = format!("{}/src/index.ts", root);
            for neighbour in [(i + 1) % projects, (i + 2) % projects] {
                imports.push(ImportRecord::new(&name, &file, format!("@bench/lib{}", neighbour)));
            }
            imports.push(ImportRecord::new(&name, &file, package.as_str()));
            imports.push(ImportRecord::new(&name, &file, "node:path"));
            imports.push(ImportRecord::new(&name, &file, "./util").dynamic());

            nodes.push(ProjectNode::new(name, root));
        }

        Self {
            fs: Arc::new(fs),
            projects: nodes,
            externals,
            imports,
        }
    }

    /// Fresh locator with empty caches
    pub fn locator(&self) -> TargetProjectLocator {
        TargetProjectLocator::builder("/ws")
            .projects(self.projects.clone())
            .externals(self.externals.clone())
            .file_system(self.fs.clone())
            .build()
    }
}
