//! Benchmarks for candidate filtering and two-hop exploration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jdm_infer::graph::Direction;
use jdm_infer::graph::memory::MemoryGraph;
use jdm_infer::infer::InferSettings;
use jdm_infer::infer::explore::explore;
use jdm_infer::infer::filter::filter_edges;
use jdm_infer::infer::patterns::PatternCatalog;

/// `intermediates` shared nodes, each linked to both ends by `per_node`
/// edges of alternating sign.
fn dense_graph(intermediates: usize, per_node: usize) -> MemoryGraph {
    let g = MemoryGraph::new();
    g.add_relation_type(6, "r_isa");
    g.add_relation_type(9, "r_has_part");
    for i in 0..intermediates {
        let x = format!("x{i}");
        for k in 0..per_node {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            let w = sign * (5.0 + k as f64);
            g.relate("a", "r_isa", &x, w);
            g.relate(&x, "r_has_part", "b", w);
        }
    }
    g
}

fn bench_filter(c: &mut Criterion) {
    let g = dense_graph(200, 20);
    let settings = InferSettings::default();
    let allowed = vec!["r_isa".to_string()];

    c.bench_function("filter_200x20", |bench| {
        bench.iter(|| black_box(filter_edges(&g, "a", Direction::From, &allowed, &settings)))
    });
}

fn bench_explore(c: &mut Criterion) {
    let g = dense_graph(200, 50);
    let settings = InferSettings::default();
    let patterns = PatternCatalog::from_groups([("default", vec![("r_isa", "R")])])
        .patterns_for("r_has_part", "R");
    let from = filter_edges(&g, "a", Direction::From, &patterns.first_types(), &settings);
    let to = filter_edges(&g, "b", Direction::To, &patterns.second_types(), &settings);

    c.bench_function("explore_200x50x50", |bench| {
        bench.iter(|| {
            black_box(explore(
                "a",
                "b",
                &from,
                &to,
                "r_has_part",
                &patterns,
                &settings,
            ))
        })
    });
}

criterion_group!(benches, bench_filter, bench_explore);
criterion_main!(benches);
