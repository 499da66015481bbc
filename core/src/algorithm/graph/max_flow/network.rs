//! Residual flow network with paired arcs
//!
//! Every input edge `k` owns two arcs in one arena: arc `2k` is the forward
//! arc carrying the edge's capacity and arc `2k + 1` its reverse, created
//! with zero residual. Pushing flow along an arc moves residual capacity to
//! its partner, so `flow(k) = capacity(k) - residual(2k)` at all times.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::FlowError;
use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::{is_valid_capacity, Capacity, CapacityGraph, EdgeId};

/// Flow value type
pub type Flow = f64;

/// Index of an arc in the residual arena
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArcId(pub usize);

impl ArcId {
    /// The paired arc running in the opposite direction.
    #[inline]
    pub fn reverse(self) -> ArcId {
        ArcId(self.0 ^ 1)
    }

    /// Whether this arc corresponds to an input edge rather than its reverse.
    #[inline]
    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }

    /// Input edge this arc belongs to.
    #[inline]
    pub fn edge(self) -> EdgeId {
        EdgeId(self.0 >> 1)
    }
}

/// Residual arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowArc {
    /// Tail vertex
    pub from: NodeId,
    /// Head vertex
    pub to: NodeId,
    /// Original capacity (zero for reverse arcs)
    pub capacity: Capacity,
    /// Current residual capacity
    pub residual: Capacity,
}

impl FlowArc {
    fn new(from: NodeId, to: NodeId, capacity: Capacity) -> Self {
        Self {
            from,
            to,
            capacity,
            residual: capacity,
        }
    }
}

/// Flow network representation with residual bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNetwork {
    /// Number of vertices in network
    vertex_count: usize,
    /// Outgoing arcs per vertex, in insertion order
    adjacency: Vec<Vec<ArcId>>,
    /// All arcs; forward and reverse arcs interleaved
    arcs: Vec<FlowArc>,
}

impl FlowNetwork {
    /// Create new flow network with specified vertex count
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            adjacency: vec![Vec::new(); vertex_count],
            arcs: Vec::new(),
        }
    }

    /// Builds the residual network of a labeled graph. Edge `k` of the graph
    /// becomes edge `k` of the network.
    pub fn from_graph<N>(graph: &CapacityGraph<N>) -> Result<Self, FlowError>
    where
        N: Eq + Hash + Clone + Debug,
    {
        let mut network = Self::new(graph.node_count());
        for (_, edge) in graph.edges() {
            network.add_edge(edge.source, edge.target, edge.capacity)?;
        }
        Ok(network)
    }

    /// Add edge to flow network along with its zero-residual reverse arc
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> Result<EdgeId, FlowError> {
        if !is_valid_capacity(capacity) {
            return Err(FlowError::InvalidCapacity {
                edge: format!("{} -> {}", from, to),
                capacity,
            });
        }
        for node in [from, to] {
            if node.0 >= self.vertex_count {
                return Err(FlowError::UnknownNode(node.to_string()));
            }
        }

        let forward = ArcId(self.arcs.len());
        let reverse = forward.reverse();

        self.arcs.push(FlowArc::new(from, to, capacity));
        self.arcs.push(FlowArc::new(to, from, 0.0));

        self.adjacency[from.0].push(forward);
        self.adjacency[to.0].push(reverse);

        Ok(forward.edge())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of input edges (half the number of arcs)
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.arcs.len() / 2
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> &FlowArc {
        &self.arcs[id.0]
    }

    /// Outgoing arcs of `node` in insertion order
    #[inline]
    pub fn arcs_from(&self, node: NodeId) -> &[ArcId] {
        &self.adjacency[node.0]
    }

    /// Current residual capacity from `u` to `v`, summed over every arc
    /// between them; zero when no arc exists.
    pub fn capacity(&self, u: NodeId, v: NodeId) -> Capacity {
        self.adjacency
            .get(u.0)
            .map(|arcs| {
                arcs.iter()
                    .map(|&a| &self.arcs[a.0])
                    .filter(|arc| arc.to == v)
                    .map(|arc| arc.residual)
                    .sum()
            })
            .unwrap_or(0.0)
    }

    /// Pushes `amount` along every arc of `path`.
    ///
    /// Fails without modifying the network unless `amount` is positive and
    /// no larger than the residual of every arc on the path.
    pub fn augment(&mut self, path: &[ArcId], amount: Flow) -> Result<(), FlowError> {
        if !(amount > 0.0 && amount.is_finite()) {
            return Err(FlowError::InsufficientCapacity {
                requested: amount,
                available: 0.0,
            });
        }
        for &arc in path {
            let residual = self.arcs[arc.0].residual;
            if amount > residual {
                return Err(FlowError::InsufficientCapacity {
                    requested: amount,
                    available: residual,
                });
            }
        }

        for &arc in path {
            self.arcs[arc.0].residual -= amount;
            self.arcs[arc.reverse().0].residual += amount;
        }
        Ok(())
    }

    /// Flow currently assigned to input edge `edge`
    #[inline]
    pub fn edge_flow(&self, edge: EdgeId) -> Flow {
        let arc = &self.arcs[edge.0 * 2];
        arc.capacity - arc.residual
    }

    /// Original capacity of input edge `edge`
    #[inline]
    pub fn edge_capacity(&self, edge: EdgeId) -> Capacity {
        self.arcs[edge.0 * 2].capacity
    }

    /// Endpoints of input edge `edge`
    #[inline]
    pub fn edge_endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        let arc = &self.arcs[edge.0 * 2];
        (arc.from, arc.to)
    }

    /// Flow out of `node` minus flow into it.
    pub fn net_outflow(&self, node: NodeId) -> Flow {
        self.adjacency[node.0]
            .iter()
            .map(|&arc| {
                let flow = self.edge_flow(arc.edge());
                if arc.is_forward() {
                    flow
                } else {
                    -flow
                }
            })
            .sum()
    }

    /// Arcs with residual capacity above `epsilon`
    pub fn residual_arcs(&self, epsilon: Capacity) -> impl Iterator<Item = (ArcId, &FlowArc)> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter(move |(_, arc)| arc.residual > epsilon)
            .map(|(i, arc)| (ArcId(i), arc))
    }

    /// Vertices reachable from `source` through arcs with residual above
    /// `epsilon`.
    pub fn reachable_from(&self, source: NodeId, epsilon: Capacity) -> Vec<bool> {
        let mut seen = vec![false; self.vertex_count];
        let mut queue = VecDeque::new();
        seen[source.0] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &arc in &self.adjacency[u.0] {
                let arc = &self.arcs[arc.0];
                if arc.residual > epsilon && !seen[arc.to.0] {
                    seen[arc.to.0] = true;
                    queue.push_back(arc.to);
                }
            }
        }
        seen
    }

    /// Drops all flow, restoring every residual to its original capacity.
    pub fn reset(&mut self) {
        for arc in &mut self.arcs {
            arc.residual = arc.capacity;
        }
    }
}
