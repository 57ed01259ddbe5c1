//! Criterion benchmarks for the restoration planner.
//!
//! Uses a synthetic ladder feeder: two parallel lines fed from the source,
//! joined by normally-open ties at every rung.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_restoration::graph::{EdgeKey, FeederGraph};
use u_restoration::network::{FaultIsolation, FeederProtection, NetworkData, OperableEdge, SwitchKind, SwitchRecord};
use u_restoration::oracle::RadialLoadOracle;
use u_restoration::planner::{RestorationConfig, RestorationPlanner};
use u_restoration::random::create_rng;

// ===========================================================================
// Ladder feeder
// ===========================================================================

/// Vertex 0 is the source. Line A is `1..=rungs`, line B is
/// `rungs+1..=2*rungs`; rung `i` ties `A_i` to `B_i`.
fn ladder(rungs: usize) -> NetworkData {
    let a = |i: usize| 1 + i;
    let b = |i: usize| 1 + rungs + i;
    let mut edges = vec![
        OperableEdge::new(0, a(0), "CB-A", true),
        OperableEdge::new(0, b(0), "CB-B", true),
    ];
    for i in 1..rungs {
        edges.push(OperableEdge::new(a(i - 1), a(i), format!("A{i}"), true));
        edges.push(OperableEdge::new(b(i - 1), b(i), format!("B{i}"), true));
    }
    for i in 0..rungs {
        edges.push(OperableEdge::new(a(i), b(i), format!("T{i}"), false));
    }

    let switches: Vec<SwitchRecord> = edges
        .iter()
        .enumerate()
        .map(|(id, e)| {
            let kind = if e.switch_code.starts_with("CB") {
                SwitchKind::Breaker
            } else {
                SwitchKind::Manual
            };
            SwitchRecord::new(id, e.switch_code.clone(), kind)
        })
        .collect();
    let n = switches.len();
    let travel: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i.abs_diff(j) == 1 { 5.0 } else { 0.0 }).collect())
        .collect();
    let vertices = 1 + 2 * rungs;

    NetworkData::new(vertices, edges, switches)
        .and_then(|net| net.with_vertex_customers((0..vertices as u64).map(|v| 10 + v).collect()))
        .and_then(|net| net.with_travel_times(travel))
        .map(|net| {
            net.with_protections(vec![
                FeederProtection::new("FA", "CB-A", 400.0),
                FeederProtection::new("FB", "CB-B", 400.0),
            ])
        })
        .expect("valid ladder")
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner_ladder");
    group.sample_size(10);

    for rungs in [4, 8, 16] {
        let net = ladder(rungs);
        let loads = vec![[6.0; 3]; net.num_vertices()];
        let config = RestorationConfig::default().with_seed(42).with_start_switch("A1");
        let isolation = FaultIsolation::new(["A1"]);

        group.bench_with_input(BenchmarkId::from_parameter(rungs), &net, |bench, net| {
            let planner = RestorationPlanner::new(net, config.clone()).expect("valid config");
            bench.iter(|| {
                let mut oracle = RadialLoadOracle::new(net, loads.clone()).expect("loads");
                black_box(planner.plan(&mut oracle, &isolation).expect("oracle ok"))
            });
        });
    }

    group.finish();
}

fn bench_spanning_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("biased_spanning_tree");

    for rungs in [16, 64, 256] {
        let net = ladder(rungs);
        let initial = net.initially_closed();
        let candidates: Vec<EdgeKey> = net.edge_keys();

        group.bench_with_input(BenchmarkId::from_parameter(rungs), &rungs, |bench, _| {
            let mut rng = create_rng(7);
            let mut graph = FeederGraph::new(net.num_vertices(), candidates.iter().copied());
            bench.iter(|| {
                graph.biased_spanning_tree(&initial, 0.99, &mut rng);
                black_box(graph.spanning().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan, bench_spanning_tree);
criterion_main!(benches);
