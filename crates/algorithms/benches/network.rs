//! Benchmarks for network graph algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stormnet_algorithms::network::{
    build_graph, prune_to_single_outlet, travel_times_to, upstream_nodes, GraphBuildParams,
};
use stormnet_core::records::NetworkModel;

/// A binary drainage tree: node `i` drains into `(i - 1) / 2`, every 16th
/// node also overflows to a second outlet
fn create_tree_network(nodes: usize) -> NetworkModel {
    let mut model = NetworkModel::new();
    for i in 1..nodes {
        let from = format!("N{}", i);
        let to = format!("N{}", (i - 1) / 2);
        let length = 10.0 + (i % 7) as f64;
        model = model.with_link(&format!("L{}", i), &from, &to, length, length / 1.5);
        if i % 16 == 0 {
            model = model.with_link(&format!("W{}", i), &from, "OVERFLOW", 500.0, 300.0);
        }
    }
    model
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/build_graph");
    for size in [1_000, 10_000, 50_000] {
        let model = create_tree_network(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| build_graph(black_box(&model), &GraphBuildParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_pruning(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/prune_to_single_outlet");
    group.sample_size(10);
    for size in [1_000, 5_000] {
        let model = create_tree_network(size);
        let built = build_graph(&model, &GraphBuildParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut graph = built.graph.clone();
                prune_to_single_outlet(black_box(&mut graph))
            })
        });
    }
    group.finish();
}

fn bench_upstream(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/upstream");
    for size in [1_000, 10_000, 50_000] {
        let model = create_tree_network(size);
        let built = build_graph(&model, &GraphBuildParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("upstream_nodes", size), &size, |b, _| {
            b.iter(|| upstream_nodes(black_box(&built.graph), "N0"))
        });
        group.bench_with_input(BenchmarkId::new("travel_times_to", size), &size, |b, _| {
            b.iter(|| travel_times_to(black_box(&built.graph), "N0"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_graph, bench_pruning, bench_upstream);
criterion_main!(benches);
