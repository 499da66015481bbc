//! Min-cut extraction and path decomposition of a finished flow

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::network::{Flow, FlowNetwork};
use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::{Capacity, CapacityGraph, EdgeId};

/// Source/sink partition certifying a maximum flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinCut<N> {
    /// Vertices still reachable from the source in the residual network
    pub source_side: Vec<N>,
    /// Every other vertex
    pub sink_side: Vec<N>,
    /// Input edges leaving the source side
    pub cut_edges: Vec<(N, N)>,
    /// Total capacity of `cut_edges`
    pub capacity: Capacity,
}

/// Flow carried along one source-to-sink path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPath<N> {
    /// Path vertices
    pub path: Vec<N>,
    /// Flow amount along path
    pub flow: Flow,
}

/// Reads the minimum cut off a saturated residual network.
pub(crate) fn extract_min_cut<N>(
    graph: &CapacityGraph<N>,
    network: &FlowNetwork,
    source: NodeId,
    epsilon: Capacity,
) -> MinCut<N>
where
    N: Eq + Hash + Clone + Debug,
{
    let reachable = network.reachable_from(source, epsilon);

    let mut source_side = Vec::new();
    let mut sink_side = Vec::new();
    for (id, label) in graph.nodes() {
        if reachable[id.0] {
            source_side.push(label.clone());
        } else {
            sink_side.push(label.clone());
        }
    }

    let mut cut_edges = Vec::new();
    let mut capacity = 0.0;
    for (id, edge) in graph.edges() {
        if !(reachable[edge.source.0] && !reachable[edge.target.0]) {
            continue;
        }
        if let (Some(u), Some(v)) = (graph.label(edge.source), graph.label(edge.target)) {
            capacity += network.edge_capacity(id);
            cut_edges.push((u.clone(), v.clone()));
        }
    }

    MinCut {
        source_side,
        sink_side,
        cut_edges,
        capacity,
    }
}

/// Splits the flow on `network` into source-to-sink paths.
///
/// Flow circulating on cycles carries no value and is cancelled on the way.
/// Paths are found in adjacency order and listed in discovery order.
pub(crate) fn decompose_paths(
    network: &FlowNetwork,
    source: NodeId,
    sink: NodeId,
    epsilon: Capacity,
) -> Vec<(Vec<NodeId>, Flow)> {
    let n = network.vertex_count();
    let mut remaining: Vec<Flow> = (0..network.edge_count())
        .map(|k| network.edge_flow(EdgeId(k)))
        .collect();
    let outgoing: Vec<Vec<EdgeId>> = (0..n)
        .map(|u| {
            network
                .arcs_from(NodeId(u))
                .iter()
                .filter(|arc| arc.is_forward())
                .map(|arc| arc.edge())
                .collect()
        })
        .collect();

    let mut pointer = vec![0usize; n];
    let mut position: Vec<Option<usize>> = vec![None; n];
    let mut paths = Vec::new();

    'walks: loop {
        let mut nodes = vec![source];
        let mut edges: Vec<EdgeId> = Vec::new();
        position.iter_mut().for_each(|p| *p = None);
        position[source.0] = Some(0);

        while let Some(&u) = nodes.last() {
            if u == sink {
                let amount = edges.iter().map(|e| remaining[e.0]).fold(Flow::INFINITY, Flow::min);
                for e in &edges {
                    remaining[e.0] -= amount;
                }
                paths.push((nodes, amount));
                continue 'walks;
            }

            let next = loop {
                match outgoing[u.0].get(pointer[u.0]) {
                    Some(&e) if remaining[e.0] > epsilon => break Some(e),
                    Some(_) => pointer[u.0] += 1,
                    None => break None,
                }
            };

            let Some(edge) = next else {
                match edges.last() {
                    // the source is exhausted
                    None => break 'walks,
                    // leftover rounding dust on the edge leading here
                    Some(&dust) => {
                        remaining[dust.0] = 0.0;
                        continue 'walks;
                    }
                }
            };

            let (_, v) = network.edge_endpoints(edge);
            match position[v.0] {
                Some(start) => {
                    // cancel the cycle v -> ... -> u -> v and resume from v
                    let amount = edges[start..]
                        .iter()
                        .chain(std::iter::once(&edge))
                        .map(|e| remaining[e.0])
                        .fold(Flow::INFINITY, Flow::min);
                    for e in edges[start..].iter().chain(std::iter::once(&edge)) {
                        remaining[e.0] -= amount;
                    }
                    for w in nodes.drain(start + 1..) {
                        position[w.0] = None;
                    }
                    edges.truncate(start);
                }
                None => {
                    position[v.0] = Some(nodes.len());
                    nodes.push(v);
                    edges.push(edge);
                }
            }
        }
    }

    paths
}
