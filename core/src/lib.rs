//! levelflow: maximum flow through level graphs and blocking flows
//!
//! The crate computes maximum flows with Dinitz's algorithm and exposes the
//! intermediate structures the algorithm is usually taught with: the
//! residual network, the BFS level graph of each phase, the augmenting paths
//! of each blocking flow, and the minimum cut certifying the result.
//!
//! ```
//! use levelflow_core::{max_flow, CapacityGraph, FlowStatus};
//!
//! let graph = CapacityGraph::from_edges(vec![
//!     ("s", "a", 10.0),
//!     ("a", "t", 5.0),
//!     ("s", "b", 5.0),
//!     ("b", "t", 10.0),
//! ])
//! .unwrap();
//!
//! let result = max_flow(&graph, &"s", &"t", None).unwrap();
//! assert_eq!(result.flow_value, 10.0);
//! assert_eq!(result.status, FlowStatus::Optimal);
//! assert_eq!(result.min_cut.unwrap().capacity, 10.0);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod execution;
pub mod validation;

pub use crate::algorithm::graph::max_flow::{
    max_flow, EdgeFlow, FlowError, FlowMetrics, FlowNetwork, FlowPath, FlowStatus, LevelGraph,
    MaxFlowConfig, MaxFlowResult, MaxFlowSolver, MinCut,
};
pub use crate::algorithm::traits::{Algorithm, AlgorithmError, NodeId};
pub use crate::data_structures::graph::{Capacity, CapacityGraph, EdgeId};
pub use crate::execution::tracer::{ExecutionTracer, TraceEvent};
pub use crate::validation::correctness::{FlowCertificate, Violation};
