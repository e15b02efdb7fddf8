//! Edge inference benchmarks: sequential versus rayon

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use locus_benchmarks::{criterion_config, SyntheticWorkspace};
use locus_resolver::{infer_edges, infer_edges_parallel};

fn bench_edge_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_inference");
    group.sample_size(20);

    for size in [100, 1000] {
        let workspace = SyntheticWorkspace::new(size);
        group.throughput(Throughput::Elements(workspace.imports.len() as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &workspace, |b, workspace| {
            b.iter(|| {
                let locator = workspace.locator();
                black_box(infer_edges(&locator, &workspace.imports).edge_count())
            });
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &workspace, |b, workspace| {
            b.iter(|| {
                let locator = workspace.locator();
                black_box(infer_edges_parallel(&locator, &workspace.imports).edge_count())
            });
        });
    }

    group.finish();
}

fn bench_cycle_detection(c: &mut Criterion) {
    let workspace = SyntheticWorkspace::new(1000);
    let locator = workspace.locator();
    let graph = infer_edges_parallel(&locator, &workspace.imports);

    c.bench_function("find_cycle_1000", |b| b.iter(|| black_box(graph.find_cycle())));
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_edge_inference, bench_cycle_detection
}
criterion_main!(benches);
