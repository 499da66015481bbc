use std::collections::{HashSet, VecDeque};

use levelflow_core::validation::cut_capacity;
use levelflow_core::{
    max_flow, CapacityGraph, ExecutionTracer, FlowCertificate, FlowStatus, MaxFlowConfig,
    MaxFlowSolver, TraceEvent,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_graph(rng: &mut StdRng, nodes: usize, edges: usize, integral: bool) -> CapacityGraph<usize> {
    let mut graph = CapacityGraph::new();
    for node in 0..nodes {
        graph.add_node(node);
    }
    for _ in 0..edges {
        let u = rng.gen_range(0..nodes);
        let v = rng.gen_range(0..nodes);
        let capacity = if integral {
            rng.gen_range(0..20) as f64
        } else {
            rng.gen_range(0.0..10.0)
        };
        graph.add_edge(u, v, capacity).unwrap();
    }
    graph
}

/// Shortest-augmenting-path reference on a dense residual matrix
fn edmonds_karp(graph: &CapacityGraph<usize>, source: usize, sink: usize) -> f64 {
    let n = graph.node_count();
    let mut residual = vec![vec![0.0f64; n]; n];
    for (_, edge) in graph.edges() {
        residual[edge.source.as_usize()][edge.target.as_usize()] += edge.capacity;
    }

    let mut total = 0.0;
    loop {
        let mut parent = vec![usize::MAX; n];
        parent[source] = source;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            for v in 0..n {
                if parent[v] == usize::MAX && residual[u][v] > 1e-12 {
                    parent[v] = u;
                    queue.push_back(v);
                }
            }
        }
        if parent[sink] == usize::MAX {
            return total;
        }

        let mut bottleneck = f64::INFINITY;
        let mut v = sink;
        while v != source {
            bottleneck = bottleneck.min(residual[parent[v]][v]);
            v = parent[v];
        }
        let mut v = sink;
        while v != source {
            residual[parent[v]][v] -= bottleneck;
            residual[v][parent[v]] += bottleneck;
            v = parent[v];
        }
        total += bottleneck;
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-7 * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn matches_reference_on_random_integral_graphs() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..60 {
        let nodes = rng.gen_range(2..14);
        let edges = rng.gen_range(0..nodes * 4);
        let graph = random_graph(&mut rng, nodes, edges, true);
        let (source, sink) = (0, nodes - 1);

        let result = max_flow(&graph, &source, &sink, None).unwrap();
        let expected = edmonds_karp(&graph, source, sink);
        assert_eq!(result.flow_value, expected, "round {}", round);
        assert_eq!(result.status, FlowStatus::Optimal);

        let violations = FlowCertificate::default()
            .check(&graph, &source, &sink, &result)
            .unwrap();
        assert!(violations.is_empty(), "round {}: {:?}", round, violations);
    }
}

#[test]
fn matches_reference_on_random_real_graphs() {
    let mut rng = StdRng::seed_from_u64(42);

    for round in 0..40 {
        let nodes = rng.gen_range(2..20);
        let edges = rng.gen_range(nodes..nodes * 5);
        let graph = random_graph(&mut rng, nodes, edges, false);
        let (source, sink) = (0, nodes - 1);

        let result = max_flow(&graph, &source, &sink, None).unwrap();
        let expected = edmonds_karp(&graph, source, sink);
        assert!(close(result.flow_value, expected), "round {}: {} vs {}", round, result.flow_value, expected);

        let violations = FlowCertificate::new(1e-7)
            .check(&graph, &source, &sink, &result)
            .unwrap();
        assert!(violations.is_empty(), "round {}: {:?}", round, violations);
    }
}

#[test]
fn flow_never_exceeds_any_cut() {
    let mut rng = StdRng::seed_from_u64(7);
    let graph = random_graph(&mut rng, 10, 40, true);
    let result = max_flow(&graph, &0, &9, None).unwrap();

    for _ in 0..200 {
        let mut side: HashSet<usize> = (1..9).filter(|_| rng.gen_bool(0.5)).collect();
        side.insert(0);
        assert!(result.flow_value <= cut_capacity(&graph, &side) + 1e-9);
    }

    let min_cut = result.min_cut.as_ref().unwrap();
    let side: HashSet<usize> = min_cut.source_side.iter().copied().collect();
    assert_eq!(cut_capacity(&graph, &side), result.flow_value);
}

#[test]
fn repeated_runs_agree() {
    let mut rng = StdRng::seed_from_u64(99);
    let graph = random_graph(&mut rng, 12, 50, false);
    let solver = MaxFlowSolver::new();

    let first = solver.solve(&graph, &0, &11).unwrap();
    let second = solver.solve(&graph, &0, &11).unwrap();
    assert_eq!(first.flow_value, second.flow_value);
    assert_eq!(first.flow_map(), second.flow_map());
}

#[test]
fn flow_paths_sum_to_value() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..20 {
        let graph = random_graph(&mut rng, 9, 30, true);
        let result = max_flow(&graph, &0, &8, None).unwrap();

        let total: f64 = result.flow_paths.iter().map(|p| p.flow).sum();
        assert!(close(total, result.flow_value));
        for path in &result.flow_paths {
            assert_eq!(path.path.first(), Some(&0));
            assert_eq!(path.path.last(), Some(&8));
            assert!(path.flow > 0.0);
        }
    }
}

#[test]
fn undirected_input_is_symmetric() {
    // a 2x3 grid with unit links, undirected
    let graph = CapacityGraph::from_undirected_edges(vec![
        ("a1", "a2", 1.0),
        ("a2", "a3", 1.0),
        ("b1", "b2", 1.0),
        ("b2", "b3", 1.0),
        ("a1", "b1", 1.0),
        ("a2", "b2", 1.0),
        ("a3", "b3", 1.0),
    ])
    .unwrap();

    let forward = max_flow(&graph, &"a1", &"b3", None).unwrap();
    let backward = max_flow(&graph, &"b3", &"a1", None).unwrap();
    assert_eq!(forward.flow_value, 2.0);
    assert_eq!(backward.flow_value, 2.0);
}

#[test]
fn cutoff_result_is_feasible_but_flagged() {
    // ten disjoint routes of lengths 1..=10, one unit each
    let mut graph = CapacityGraph::new();
    for route in 0..10usize {
        let mut prev = 0usize;
        for hop in 0..route {
            let next = 100 + route * 10 + hop;
            graph.add_edge(prev, next, 1.0).unwrap();
            prev = next;
        }
        graph.add_edge(prev, 1, 1.0).unwrap();
    }

    let result = max_flow(&graph, &0, &1, Some(3.0)).unwrap();
    assert!(result.flow_value >= 3.0);
    assert!(result.flow_value < 10.0);
    assert!(!result.is_maximum());

    let violations = FlowCertificate::default().check(&graph, &0, &1, &result).unwrap();
    assert!(violations.is_empty(), "{:?}", violations);
}

#[test]
fn traced_phases_have_growing_sink_level() {
    let mut rng = StdRng::seed_from_u64(11);
    let graph = random_graph(&mut rng, 15, 60, true);
    let solver = MaxFlowSolver::with_config(MaxFlowConfig::new()).unwrap();

    let mut tracer = ExecutionTracer::new();
    let result = solver.solve_traced(&graph, &0, &14, &mut tracer).unwrap();

    let sink_levels: Vec<usize> = tracer
        .points()
        .iter()
        .filter_map(|p| match p.event {
            TraceEvent::LevelGraphBuilt { sink_level, .. } => sink_level,
            _ => None,
        })
        .collect();
    assert_eq!(sink_levels.len(), result.metrics.phases);
    assert!(sink_levels.windows(2).all(|w| w[0] < w[1]));

    let pushed: f64 = tracer.augmenting_paths().iter().map(|(_, amount)| amount).sum();
    assert!(close(pushed, result.flow_value));
}
