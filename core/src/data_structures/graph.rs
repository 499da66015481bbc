//! Labeled capacity graph used as solver input
//!
//! Nodes are arbitrary hashable labels mapped to dense [`NodeId`]s in
//! insertion order. Edges are directed and carry a non-negative finite
//! capacity; adding the same ordered pair twice merges the capacities, so
//! every ordered pair owns at most one [`EdgeId`]. Undirected edges are
//! normalized into two opposite directed edges.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::max_flow::FlowError;
use crate::algorithm::traits::NodeId;

/// Flow capacity type
pub type Capacity = f64;

/// Dense edge identifier, assigned in insertion order
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Directed edge with its capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub capacity: Capacity,
}

/// Returns true for capacities the solver accepts.
#[inline]
pub fn is_valid_capacity(capacity: Capacity) -> bool {
    capacity.is_finite() && capacity >= 0.0
}

/// Directed capacity graph over labels of type `N`
#[derive(Debug, Clone)]
pub struct CapacityGraph<N> {
    /// Labels indexed by `NodeId`
    labels: Vec<N>,
    /// Reverse label lookup
    index: HashMap<N, NodeId>,
    /// Edges indexed by `EdgeId`
    edges: Vec<CapacityEdge>,
    /// O(1) lookup by ordered endpoint pair
    lookup: HashMap<(NodeId, NodeId), EdgeId>,
}

impl<N> Default for CapacityGraph<N> {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<N> CapacityGraph<N>
where
    N: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directed graph from `(u, v, capacity)` triples.
    pub fn from_edges<I>(edges: I) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = (N, N, Capacity)>,
    {
        let mut graph = Self::new();
        for (u, v, capacity) in edges {
            graph.add_edge(u, v, capacity)?;
        }
        Ok(graph)
    }

    /// Builds a graph from undirected `{u, v}` triples, normalized to
    /// symmetric directed edges.
    pub fn from_undirected_edges<I>(edges: I) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = (N, N, Capacity)>,
    {
        let mut graph = Self::new();
        for (u, v, capacity) in edges {
            graph.add_undirected_edge(u, v, capacity)?;
        }
        Ok(graph)
    }

    /// Adds a node if absent and returns its identifier.
    pub fn add_node(&mut self, label: N) -> NodeId {
        if let Some(&id) = self.index.get(&label) {
            return id;
        }
        let id = NodeId(self.labels.len());
        self.labels.push(label.clone());
        self.index.insert(label, id);
        id
    }

    /// Adds a directed edge, merging with an existing edge on the same
    /// ordered pair.
    ///
    /// The capacity is validated before the graph is touched, so a rejected
    /// edge leaves no trace (not even its endpoints).
    pub fn add_edge(&mut self, source: N, target: N, capacity: Capacity) -> Result<EdgeId, FlowError> {
        if !is_valid_capacity(capacity) {
            return Err(FlowError::InvalidCapacity {
                edge: format!("{:?} -> {:?}", source, target),
                capacity,
            });
        }

        let u = self.add_node(source);
        let v = self.add_node(target);

        if let Some(&edge_id) = self.lookup.get(&(u, v)) {
            self.edges[edge_id.0].capacity += capacity;
            return Ok(edge_id);
        }

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(CapacityEdge {
            source: u,
            target: v,
            capacity,
        });
        self.lookup.insert((u, v), edge_id);
        Ok(edge_id)
    }

    /// Adds `{u, v}` as the two directed edges `(u, v)` and `(v, u)`.
    pub fn add_undirected_edge(&mut self, u: N, v: N, capacity: Capacity) -> Result<(EdgeId, EdgeId), FlowError> {
        if u == v {
            let edge = self.add_edge(u, v, capacity)?;
            return Ok((edge, edge));
        }
        let forward = self.add_edge(u.clone(), v.clone(), capacity)?;
        let backward = self.add_edge(v, u, capacity)?;
        Ok((forward, backward))
    }

    pub fn node_id(&self, label: &N) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Resolves a label, failing with `UnknownNode` when absent.
    pub fn require_node(&self, label: &N) -> Result<NodeId, FlowError> {
        self.node_id(label)
            .ok_or_else(|| FlowError::UnknownNode(format!("{:?}", label)))
    }

    pub fn edge_id(&self, source: &N, target: &N) -> Option<EdgeId> {
        let u = self.node_id(source)?;
        let v = self.node_id(target)?;
        self.lookup.get(&(u, v)).copied()
    }

    /// Capacity of the edge `(source, target)`, if present.
    pub fn capacity(&self, source: &N, target: &N) -> Option<Capacity> {
        self.edge_id(source, target).map(|id| self.edges[id.0].capacity)
    }
}

impl<N> CapacityGraph<N> {
    #[inline]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn label(&self, id: NodeId) -> Option<&N> {
        self.labels.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&CapacityEdge> {
        self.edges.get(id.0)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.labels.iter().enumerate().map(|(i, label)| (NodeId(i), label))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &CapacityEdge)> + '_ {
        self.edges.iter().enumerate().map(|(i, edge)| (EdgeId(i), edge))
    }
}
