//! Maximum Flow via Level Graphs and Blocking Flows
//!
//! This module implements Dinitz's maximum flow algorithm. Each phase
//! layers the residual network by BFS distance from the source and then
//! saturates every shortest augmenting path of that layering (a blocking
//! flow). The sink's distance strictly grows from phase to phase, so at most
//! `V - 1` phases run before the sink becomes unreachable.
//!
//! # Performance Characteristics
//!
//! - Time Complexity: O(V^2 E) in general, O(E sqrt(V)) on unit networks
//! - Space Complexity: O(V + E) for the residual arena and phase buffers
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod blocking;
pub mod config;
pub mod cut;
pub mod level;
pub mod network;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{
    Algorithm, AlgorithmComplexity, AlgorithmError, AlgorithmId, AlgorithmParameter,
    AlgorithmProfiler, NodeId, ParameterType,
};
use crate::data_structures::graph::{Capacity, CapacityGraph};
use crate::execution::tracer::{ExecutionTracer, TraceEvent};

pub use self::blocking::{BlockingFlowFinder, PhaseOutcome};
pub use self::config::{MaxFlowConfig, DEFAULT_EPSILON};
pub use self::cut::{FlowPath, MinCut};
pub use self::level::LevelGraph;
pub use self::network::{ArcId, Flow, FlowArc, FlowNetwork};

/// Flow algorithm errors
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid capacity {capacity} on edge {edge}")]
    InvalidCapacity { edge: String, capacity: Capacity },
    #[error("Invalid source or sink vertex: {0}")]
    InvalidTerminals(String),
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Insufficient capacity for flow: requested {requested}, available {available}")]
    InsufficientCapacity { requested: Flow, available: Capacity },
    #[error(transparent)]
    InvalidParameter(#[from] AlgorithmError),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowStatus {
    /// The sink became unreachable; the flow is maximum
    Optimal,
    /// The cutoff was reached first; the flow is feasible but not
    /// necessarily maximum
    CutoffReached,
}

/// Flow assigned to one input edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeFlow<N> {
    pub source: N,
    pub target: N,
    pub capacity: Capacity,
    pub flow: Flow,
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Blocking-flow phases executed
    pub phases: usize,
    /// Augmenting paths applied over all phases
    pub augmenting_paths: usize,
    /// Dead-end vertices pruned over all phases
    pub retreats: usize,
    /// Arc inspections made by the blocking-flow search
    pub arcs_scanned: usize,
    /// Vertices labeled by all level-graph builds
    pub nodes_labeled: usize,
    /// Wall time of the run
    pub execution_time: Duration,
}

impl FlowMetrics {
    fn absorb(&mut self, outcome: &PhaseOutcome) {
        self.augmenting_paths += outcome.augmenting_paths;
        self.retreats += outcome.retreats;
        self.arcs_scanned += outcome.arcs_scanned;
    }
}

/// Outcome of driving a residual network to completion
#[derive(Debug, Clone, PartialEq)]
pub struct DriveOutcome {
    pub flow_value: Flow,
    pub status: FlowStatus,
    pub metrics: FlowMetrics,
}

/// Maximum flow result with detailed flow information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxFlowResult<N> {
    /// Maximum flow value (or the value reached at the cutoff)
    pub flow_value: Flow,
    pub status: FlowStatus,
    /// Every input edge in insertion order, zero flows included
    pub edge_flows: Vec<EdgeFlow<N>>,
    /// Minimum cut; present only for `Optimal` runs
    pub min_cut: Option<MinCut<N>>,
    /// Flow decomposition into paths
    pub flow_paths: Vec<FlowPath<N>>,
    pub metrics: FlowMetrics,
    /// Phase trace when tracing was enabled in the config
    pub trace: Option<ExecutionTracer>,
}

impl<N> MaxFlowResult<N>
where
    N: Eq + Hash + Clone,
{
    /// Whether the reported value is the true maximum
    pub fn is_maximum(&self) -> bool {
        self.status == FlowStatus::Optimal
    }

    /// Flow on the edge `(source, target)`, if it is an input edge
    pub fn flow(&self, source: &N, target: &N) -> Option<Flow> {
        self.edge_flows
            .iter()
            .find(|e| &e.source == source && &e.target == target)
            .map(|e| e.flow)
    }

    /// Edges carrying positive flow
    pub fn nonzero_flows(&self) -> impl Iterator<Item = &EdgeFlow<N>> + '_ {
        self.edge_flows.iter().filter(|e| e.flow > 0.0)
    }

    pub fn flow_map(&self) -> HashMap<(N, N), Flow> {
        self.edge_flows
            .iter()
            .map(|e| ((e.source.clone(), e.target.clone()), e.flow))
            .collect()
    }
}

/// Level-graph maximum flow solver
#[derive(Debug, Clone, Default)]
pub struct MaxFlowSolver {
    config: MaxFlowConfig,
}

impl MaxFlowSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MaxFlowConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MaxFlowConfig {
        &self.config
    }

    /// Computes a maximum flow from `source` to `sink`.
    ///
    /// With `trace` enabled in the config the result carries the phase trace.
    pub fn solve<N>(&self, graph: &CapacityGraph<N>, source: &N, sink: &N) -> Result<MaxFlowResult<N>, FlowError>
    where
        N: Eq + Hash + Clone + Debug,
    {
        if self.config.trace {
            let mut tracer = ExecutionTracer::new();
            let mut result = self.run(graph, source, sink, Some(&mut tracer))?;
            result.trace = Some(tracer);
            Ok(result)
        } else {
            self.run(graph, source, sink, None)
        }
    }

    /// Like [`solve`](Self::solve), recording phase events into `tracer`.
    pub fn solve_traced<N>(
        &self,
        graph: &CapacityGraph<N>,
        source: &N,
        sink: &N,
        tracer: &mut ExecutionTracer,
    ) -> Result<MaxFlowResult<N>, FlowError>
    where
        N: Eq + Hash + Clone + Debug,
    {
        self.run(graph, source, sink, Some(tracer))
    }

    fn run<N>(
        &self,
        graph: &CapacityGraph<N>,
        source: &N,
        sink: &N,
        tracer: Option<&mut ExecutionTracer>,
    ) -> Result<MaxFlowResult<N>, FlowError>
    where
        N: Eq + Hash + Clone + Debug,
    {
        self.config.validate()?;
        let s = graph.require_node(source)?;
        let t = graph.require_node(sink)?;
        if s == t {
            return Err(FlowError::InvalidTerminals(format!(
                "source and sink are both {:?}",
                source
            )));
        }

        info!(
            "max flow {:?} -> {:?} on {} nodes, {} edges",
            source,
            sink,
            graph.node_count(),
            graph.edge_count()
        );

        let mut network = FlowNetwork::from_graph(graph)?;
        let outcome = self.drive(&mut network, s, t, tracer)?;

        let edge_flows = graph
            .edges()
            .filter_map(|(id, edge)| {
                let u = graph.label(edge.source)?;
                let v = graph.label(edge.target)?;
                Some(EdgeFlow {
                    source: u.clone(),
                    target: v.clone(),
                    capacity: edge.capacity,
                    flow: network.edge_flow(id),
                })
            })
            .collect();

        let min_cut = match outcome.status {
            FlowStatus::Optimal => Some(cut::extract_min_cut(graph, &network, s, self.config.epsilon)),
            FlowStatus::CutoffReached => None,
        };

        let flow_paths = cut::decompose_paths(&network, s, t, self.config.epsilon)
            .into_iter()
            .map(|(ids, flow)| FlowPath {
                path: ids.into_iter().filter_map(|id| graph.label(id).cloned()).collect(),
                flow,
            })
            .collect();

        info!(
            "max flow value {} ({:?}) after {} phases",
            outcome.flow_value, outcome.status, outcome.metrics.phases
        );

        Ok(MaxFlowResult {
            flow_value: outcome.flow_value,
            status: outcome.status,
            edge_flows,
            min_cut,
            flow_paths,
            metrics: outcome.metrics,
            trace: None,
        })
    }

    /// Runs blocking-flow phases on `network` until the sink is unreachable
    /// or the cutoff is met.
    ///
    /// Flow already present on `network` counts toward the value.
    pub fn drive(
        &self,
        network: &mut FlowNetwork,
        source: NodeId,
        sink: NodeId,
        mut tracer: Option<&mut ExecutionTracer>,
    ) -> Result<DriveOutcome, FlowError> {
        for node in [source, sink] {
            if node.0 >= network.vertex_count() {
                return Err(FlowError::UnknownNode(node.to_string()));
            }
        }

        let epsilon = self.config.epsilon;
        let mut finder = BlockingFlowFinder::new(source, sink, epsilon)?;
        let mut profiler = AlgorithmProfiler::new();
        let mut metrics = FlowMetrics::default();
        let mut total = network.net_outflow(source);

        profiler.start();
        let status = loop {
            if let Some(cutoff) = self.config.cutoff {
                if total >= cutoff {
                    debug!("cutoff {} reached with flow {}", cutoff, total);
                    if let Some(tracer) = tracer.as_deref_mut() {
                        tracer.record(TraceEvent::CutoffReached {
                            total_flow: total,
                            cutoff,
                        });
                    }
                    break FlowStatus::CutoffReached;
                }
            }

            let phase = profiler.get_metrics().steps_executed;
            let levels = LevelGraph::build(network, source, sink, epsilon);
            profiler.record_nodes_explored(levels.labeled_count());

            if let Some(tracer) = tracer.as_deref_mut() {
                tracer.record(TraceEvent::LevelGraphBuilt {
                    phase,
                    sink_level: levels.level(sink),
                    labeled: levels.labeled_count(),
                    admissible_arcs: levels.admissible_arcs(network).len(),
                });
            }

            if !levels.reaches(sink) {
                if let Some(tracer) = tracer.as_deref_mut() {
                    tracer.record(TraceEvent::Terminated {
                        phases: phase,
                        total_flow: total,
                    });
                }
                break FlowStatus::Optimal;
            }

            let outcome = finder.run(network, &levels, phase, tracer.as_deref_mut())?;
            total += outcome.flow;
            metrics.absorb(&outcome);
            profiler.record_step();

            debug!(
                "phase {}: sink level {:?}, pushed {} over {} paths ({} retreats), total {}",
                phase,
                levels.level(sink),
                outcome.flow,
                outcome.augmenting_paths,
                outcome.retreats,
                total
            );

            if let Some(tracer) = tracer.as_deref_mut() {
                tracer.record(TraceEvent::PhaseCompleted {
                    phase,
                    phase_flow: outcome.flow,
                    total_flow: total,
                });
            }
        };
        profiler.stop();

        let profile = profiler.get_metrics();
        metrics.phases = profile.steps_executed;
        metrics.nodes_labeled = profile.nodes_explored;
        metrics.execution_time = profile.execution_time;

        Ok(DriveOutcome {
            flow_value: total,
            status,
            metrics,
        })
    }
}

/// Computes a maximum flow with default settings and an optional cutoff.
pub fn max_flow<N>(
    graph: &CapacityGraph<N>,
    source: &N,
    sink: &N,
    cutoff: Option<Flow>,
) -> Result<MaxFlowResult<N>, FlowError>
where
    N: Eq + Hash + Clone + Debug,
{
    let config = MaxFlowConfig {
        cutoff,
        ..MaxFlowConfig::default()
    };
    MaxFlowSolver::with_config(config)?.solve(graph, source, sink)
}

impl Algorithm for MaxFlowSolver {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::new("dinitz")
    }

    fn name(&self) -> &'static str {
        "Dinitz"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> String {
        "Maximum flow by repeated blocking flows over BFS level graphs of the residual \
         network, with current-arc pointers and dead-end pruning."
            .to_string()
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(V^2 E)".to_string(),
            space_complexity: "O(V + E)".to_string(),
            best_case: "O(V + E)".to_string(),
            average_case: "O(V E log V)".to_string(),
            worst_case: "O(V^2 E)".to_string(),
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter {
                name: "cutoff".to_string(),
                value: self.get_parameter("cutoff").unwrap_or_default(),
                value_type: ParameterType::Float,
                constraints: Some(config::cutoff_constraints()),
            },
            AlgorithmParameter {
                name: "epsilon".to_string(),
                value: self.config.epsilon.to_string(),
                value_type: ParameterType::Float,
                constraints: Some(config::epsilon_constraints()),
            },
            AlgorithmParameter {
                name: "trace".to_string(),
                value: self.config.trace.to_string(),
                value_type: ParameterType::Boolean,
                constraints: None,
            },
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "cutoff" => {
                if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    self.config.cutoff = None;
                    return Ok(());
                }
                let cutoff = parse_float(name, value)?;
                config::cutoff_constraints().check(name, cutoff)?;
                self.config.cutoff = Some(cutoff);
                Ok(())
            }
            "epsilon" => {
                let epsilon = parse_float(name, value)?;
                config::epsilon_constraints().check(name, epsilon)?;
                self.config.epsilon = epsilon;
                Ok(())
            }
            "trace" => {
                self.config.trace = value
                    .parse::<bool>()
                    .map_err(|_| AlgorithmError::invalid_parameter(name, "must be true or false"))?;
                Ok(())
            }
            _ => Err(AlgorithmError::invalid_parameter(name, "unknown parameter")),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "cutoff" => Some(
                self.config
                    .cutoff
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
            "epsilon" => Some(self.config.epsilon.to_string()),
            "trace" => Some(self.config.trace.to_string()),
            _ => None,
        }
    }
}

fn parse_float(name: &str, value: &str) -> Result<f64, AlgorithmError> {
    value
        .parse::<f64>()
        .map_err(|_| AlgorithmError::invalid_parameter(name, format!("'{}' is not a number", value)))
}
