//! Breadth-first layering of the residual network
//!
//! A level graph keeps only the residual arcs that advance exactly one BFS
//! layer away from the source. It is rebuilt from scratch before every
//! blocking-flow phase.

use std::collections::VecDeque;

use log::trace;

use super::network::{ArcId, FlowNetwork};
use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::Capacity;

/// Level assignment of one phase
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGraph {
    /// BFS depth per vertex; `None` when unreachable
    levels: Vec<Option<usize>>,
    /// Vertices in discovery order
    order: Vec<NodeId>,
    /// Residuals at or below this are treated as saturated
    epsilon: Capacity,
}

impl LevelGraph {
    /// Layers the residual network from `source`.
    ///
    /// Once `sink` receives level `L`, vertices at level `L` or deeper are
    /// not expanded: every level-`L` vertex is already discovered at that
    /// point and nothing deeper can lie on a shortest path to the sink.
    pub fn build(network: &FlowNetwork, source: NodeId, sink: NodeId, epsilon: Capacity) -> Self {
        let mut levels = vec![None; network.vertex_count()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        levels[source.0] = Some(0);
        order.push(source);
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            let depth = levels[u.0].unwrap_or(0);
            if let Some(sink_level) = levels[sink.0] {
                if depth >= sink_level {
                    break;
                }
            }

            for &arc_id in network.arcs_from(u) {
                let arc = network.arc(arc_id);
                if arc.residual > epsilon && levels[arc.to.0].is_none() {
                    levels[arc.to.0] = Some(depth + 1);
                    order.push(arc.to);
                    queue.push_back(arc.to);
                }
            }
        }

        trace!(
            "level graph: {} of {} vertices labeled, sink level {:?}",
            order.len(),
            network.vertex_count(),
            levels[sink.0]
        );

        Self {
            levels,
            order,
            epsilon,
        }
    }

    #[inline]
    pub fn level(&self, node: NodeId) -> Option<usize> {
        self.levels.get(node.0).copied().flatten()
    }

    #[inline]
    pub fn reaches(&self, node: NodeId) -> bool {
        self.level(node).is_some()
    }

    /// Number of labeled vertices
    pub fn labeled_count(&self) -> usize {
        self.order.len()
    }

    /// Deepest assigned level. Equals the sink's level whenever the sink
    /// was reached, since layering stops there.
    pub fn depth(&self) -> usize {
        self.order
            .last()
            .and_then(|&node| self.level(node))
            .unwrap_or(0)
    }

    /// Labeled vertices in discovery order
    pub fn discovery_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Whether `arc` belongs to the level graph.
    #[inline]
    pub fn is_admissible(&self, network: &FlowNetwork, arc: ArcId) -> bool {
        let arc = network.arc(arc);
        if arc.residual <= self.epsilon {
            return false;
        }
        match (self.level(arc.from), self.level(arc.to)) {
            (Some(from), Some(to)) => to == from + 1,
            _ => false,
        }
    }

    /// Admissible arcs entering `node`.
    pub fn predecessors(&self, network: &FlowNetwork, node: NodeId) -> Vec<ArcId> {
        // incoming arcs are the partners of the outgoing ones
        network
            .arcs_from(node)
            .iter()
            .map(|arc| arc.reverse())
            .filter(|&arc| self.is_admissible(network, arc))
            .collect()
    }

    /// Every admissible arc, grouped by tail in discovery order.
    pub fn admissible_arcs(&self, network: &FlowNetwork) -> Vec<ArcId> {
        self.order
            .iter()
            .flat_map(|&u| network.arcs_from(u).iter().copied())
            .filter(|&arc| self.is_admissible(network, arc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// s=0, a=1, b=2, t=3 plus a dangling vertex 4 behind t
    fn diamond() -> FlowNetwork {
        let mut network = FlowNetwork::new(5);
        network.add_edge(NodeId(0), NodeId(1), 10.0).unwrap(); // arcs 0/1
        network.add_edge(NodeId(1), NodeId(3), 5.0).unwrap(); // arcs 2/3
        network.add_edge(NodeId(0), NodeId(2), 5.0).unwrap(); // arcs 4/5
        network.add_edge(NodeId(2), NodeId(3), 10.0).unwrap(); // arcs 6/7
        network.add_edge(NodeId(1), NodeId(2), 1.0).unwrap(); // arcs 8/9
        network.add_edge(NodeId(3), NodeId(4), 1.0).unwrap(); // arcs 10/11
        network
    }

    #[test]
    fn test_levels_follow_hop_distance() {
        let network = diamond();
        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);

        assert_eq!(levels.level(NodeId(0)), Some(0));
        assert_eq!(levels.level(NodeId(1)), Some(1));
        assert_eq!(levels.level(NodeId(2)), Some(1));
        assert_eq!(levels.level(NodeId(3)), Some(2));
        assert_eq!(levels.depth(), 2);
        assert_eq!(levels.discovery_order(), &[NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_early_exit_skips_vertices_beyond_sink() {
        let network = diamond();
        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);

        assert!(!levels.reaches(NodeId(4)));
        assert_eq!(levels.labeled_count(), 4);
    }

    #[test]
    fn test_sink_level_is_finished_after_sink_is_found() {
        // same diamond, plus 2 -> 5 so that 5 joins the sink's level after
        // the sink was already labeled from 1
        let mut network = FlowNetwork::new(6);
        network.add_edge(NodeId(0), NodeId(1), 10.0).unwrap();
        network.add_edge(NodeId(1), NodeId(3), 5.0).unwrap();
        network.add_edge(NodeId(0), NodeId(2), 5.0).unwrap();
        network.add_edge(NodeId(2), NodeId(3), 10.0).unwrap();
        network.add_edge(NodeId(1), NodeId(2), 1.0).unwrap();
        network.add_edge(NodeId(3), NodeId(4), 1.0).unwrap();
        network.add_edge(NodeId(2), NodeId(5), 1.0).unwrap(); // arcs 12/13

        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);
        assert_eq!(levels.level(NodeId(5)), Some(2));
        assert!(levels.is_admissible(&network, ArcId(12)));
        assert_eq!(levels.predecessors(&network, NodeId(5)), vec![ArcId(12)]);
        assert_eq!(
            levels.discovery_order(),
            &[NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(5)]
        );
        assert!(!levels.reaches(NodeId(4)));
        assert_eq!(levels.depth(), 2);
    }

    #[test]
    fn test_admissible_arcs_exclude_same_level_edges() {
        let network = diamond();
        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);

        // 1 -> 2 connects two level-1 vertices
        assert!(!levels.is_admissible(&network, ArcId(8)));
        assert_eq!(
            levels.admissible_arcs(&network),
            vec![ArcId(0), ArcId(4), ArcId(2), ArcId(6)]
        );
        assert_eq!(levels.predecessors(&network, NodeId(3)), vec![ArcId(2), ArcId(6)]);
        assert!(levels.predecessors(&network, NodeId(0)).is_empty());
    }

    #[test]
    fn test_saturated_arcs_are_skipped() {
        let mut network = diamond();
        network.augment(&[ArcId(0), ArcId(2)], 5.0).unwrap();
        network.augment(&[ArcId(4), ArcId(6)], 5.0).unwrap();

        // the only remaining route runs through the 1 -> 2 link
        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);
        assert_eq!(levels.level(NodeId(2)), Some(2));
        assert_eq!(levels.level(NodeId(3)), Some(3));
        assert_eq!(levels.depth(), 3);

        network.augment(&[ArcId(0), ArcId(8), ArcId(6)], 1.0).unwrap();
        let levels = LevelGraph::build(&network, NodeId(0), NodeId(3), 0.0);
        assert!(!levels.reaches(NodeId(3)));
        assert!(!levels.reaches(NodeId(2)));
        assert_eq!(levels.level(NodeId(1)), Some(1));
        assert_eq!(levels.depth(), 1);
    }

    #[test]
    fn test_epsilon_treats_dust_as_saturated() {
        let mut network = FlowNetwork::new(2);
        network.add_edge(NodeId(0), NodeId(1), 1e-13).unwrap();

        assert!(LevelGraph::build(&network, NodeId(0), NodeId(1), 0.0).reaches(NodeId(1)));
        assert!(!LevelGraph::build(&network, NodeId(0), NodeId(1), 1e-12).reaches(NodeId(1)));
    }
}
