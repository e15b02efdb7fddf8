//! Import resolution benchmarks
//!
//! Cold resolution through every strategy, warm cache hits, alias
//! expansion and project root lookup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use indexmap::IndexMap;
use locus_benchmarks::{criterion_config, SyntheticWorkspace};
use locus_resolver::{PathMappingTable, ProjectRootIndex};

/// Resolve every import once with empty caches
fn bench_cold_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_resolution");
    group.sample_size(20);

    for size in [10, 100, 500] {
        let workspace = SyntheticWorkspace::new(size);
        group.throughput(Throughput::Elements(workspace.imports.len() as u64));

        group.bench_with_input(BenchmarkId::new("projects", size), &workspace, |b, workspace| {
            b.iter(|| {
                let locator = workspace.locator();
                for record in &workspace.imports {
                    let root = locator.project_root(&record.source).unwrap_or(".");
                    black_box(locator.resolve(&record.specifier, root, &record.file));
                }
            });
        });
    }

    group.finish();
}

/// Resolve every import again on a populated cache
fn bench_cached_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_resolution");

    for size in [100, 1000] {
        let workspace = SyntheticWorkspace::new(size);
        let locator = workspace.locator();
        for record in &workspace.imports {
            let root = locator.project_root(&record.source).unwrap_or(".");
            locator.resolve(&record.specifier, root, &record.file);
        }
        group.throughput(Throughput::Elements(workspace.imports.len() as u64));

        group.bench_with_input(BenchmarkId::new("projects", size), &workspace, |b, workspace| {
            b.iter(|| {
                for record in &workspace.imports {
                    let root = locator.project_root(&record.source).unwrap_or(".");
                    black_box(locator.resolve(&record.specifier, root, &record.file));
                }
            });
        });
    }

    group.finish();
}

/// Alias table with many wildcard patterns
fn bench_path_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_mapping");

    for patterns in [10, 100, 1000] {
        let paths: IndexMap<String, Vec<String>> = (0..patterns)
            .map(|i| (format!("@scope{}/*", i), vec![format!("libs/scope{}/*/src/index.ts", i)]))
            .collect();
        let table = PathMappingTable::new(paths);
        let last = format!("@scope{}/feature", patterns - 1);

        group.bench_with_input(BenchmarkId::new("patterns", patterns), &table, |b, table| {
            b.iter(|| black_box(table.expand(black_box(&last))));
        });
    }

    group.finish();
}

/// Deeply nested paths against many project roots
fn bench_project_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_lookup");

    for size in [100, 5000] {
        let workspace = SyntheticWorkspace::new(size);
        let index = ProjectRootIndex::new(&workspace.projects, "node_modules");
        let path = format!("libs/lib{}/src/deep/nested/dir/file.ts", size / 2);

        group.bench_with_input(BenchmarkId::new("roots", size), &index, |b, index| {
            b.iter(|| black_box(index.find_project_for_path(black_box(&path))));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_cold_resolution, bench_cached_resolution, bench_path_mapping, bench_project_lookup
}
criterion_main!(benches);
