//! Flow certificate verification
//!
//! Checks a reported flow against the graph it was computed on: capacity
//! bounds on every edge, conservation at every internal vertex, agreement of
//! the reported value with the net flow at both terminals, and, for runs
//! reported as optimal, equality with the capacity of the returned cut.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::{Flow, FlowError, MaxFlowResult};
use crate::data_structures::graph::{Capacity, CapacityGraph};

/// A broken flow property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation<N> {
    /// Result does not list one flow per input edge
    EdgeCountMismatch { expected: usize, reported: usize },
    /// Result lists an edge the graph does not have at that position
    UnknownEdge { source: N, target: N },
    NegativeFlow { source: N, target: N, flow: Flow },
    CapacityExceeded { source: N, target: N, flow: Flow, capacity: Capacity },
    ConservationBroken { node: N, imbalance: Flow },
    ValueMismatch { reported: Flow, source_outflow: Flow, sink_inflow: Flow },
    /// The reported cut is cheaper than the flow (weak duality)
    CutBelowFlow { cut_capacity: Capacity, flow_value: Flow },
    /// An optimal run whose cut does not match its value (strong duality)
    DualityGap { cut_capacity: Capacity, flow_value: Flow },
    /// An optimal run without a cut
    MissingCut,
}

/// Verifier for max-flow results
#[derive(Debug, Clone, Copy)]
pub struct FlowCertificate {
    /// Relative tolerance for floating-point comparisons
    tolerance: f64,
}

impl Default for FlowCertificate {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl FlowCertificate {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    #[inline]
    fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.tolerance * (1.0 + a.abs().max(b.abs()))
    }

    /// Lists every violated property; empty means the flow is certified.
    pub fn check<N>(
        &self,
        graph: &CapacityGraph<N>,
        source: &N,
        sink: &N,
        result: &MaxFlowResult<N>,
    ) -> Result<Vec<Violation<N>>, FlowError>
    where
        N: Eq + Hash + Clone + Debug,
    {
        let s = graph.require_node(source)?;
        let t = graph.require_node(sink)?;
        let mut violations = Vec::new();

        if result.edge_flows.len() != graph.edge_count() {
            violations.push(Violation::EdgeCountMismatch {
                expected: graph.edge_count(),
                reported: result.edge_flows.len(),
            });
            return Ok(violations);
        }

        let mut balance = vec![0.0; graph.node_count()];
        for ((_, edge), reported) in graph.edges().zip(&result.edge_flows) {
            let matches = graph.node_id(&reported.source) == Some(edge.source)
                && graph.node_id(&reported.target) == Some(edge.target);
            if !matches {
                violations.push(Violation::UnknownEdge {
                    source: reported.source.clone(),
                    target: reported.target.clone(),
                });
                continue;
            }

            let flow = reported.flow;
            if flow < -self.tolerance {
                violations.push(Violation::NegativeFlow {
                    source: reported.source.clone(),
                    target: reported.target.clone(),
                    flow,
                });
            }
            if flow > edge.capacity && !self.close(flow, edge.capacity) {
                violations.push(Violation::CapacityExceeded {
                    source: reported.source.clone(),
                    target: reported.target.clone(),
                    flow,
                    capacity: edge.capacity,
                });
            }
            balance[edge.source.0] += flow;
            balance[edge.target.0] -= flow;
        }

        for (id, label) in graph.nodes() {
            if id == s || id == t {
                continue;
            }
            if !self.close(balance[id.0], 0.0) {
                violations.push(Violation::ConservationBroken {
                    node: label.clone(),
                    imbalance: balance[id.0],
                });
            }
        }

        let source_outflow = balance[s.0];
        let sink_inflow = -balance[t.0];
        if !self.close(result.flow_value, source_outflow) || !self.close(result.flow_value, sink_inflow) {
            violations.push(Violation::ValueMismatch {
                reported: result.flow_value,
                source_outflow,
                sink_inflow,
            });
        }

        match &result.min_cut {
            Some(cut) => {
                if cut.capacity < result.flow_value && !self.close(cut.capacity, result.flow_value) {
                    violations.push(Violation::CutBelowFlow {
                        cut_capacity: cut.capacity,
                        flow_value: result.flow_value,
                    });
                } else if result.is_maximum() && !self.close(cut.capacity, result.flow_value) {
                    violations.push(Violation::DualityGap {
                        cut_capacity: cut.capacity,
                        flow_value: result.flow_value,
                    });
                }
            }
            None if result.is_maximum() => violations.push(Violation::MissingCut),
            None => {}
        }

        Ok(violations)
    }
}

/// Capacity of the edges leaving `source_side`.
pub fn cut_capacity<N>(graph: &CapacityGraph<N>, source_side: &HashSet<N>) -> Capacity
where
    N: Eq + Hash + Clone + Debug,
{
    let inside: Vec<bool> = graph.nodes().map(|(_, label)| source_side.contains(label)).collect();
    graph
        .edges()
        .filter(|(_, edge)| inside[edge.source.0] && !inside[edge.target.0])
        .map(|(_, edge)| edge.capacity)
        .sum()
}
