//! Blocking flow search inside a fixed level graph
//!
//! The search walks an explicit path stack from the source. Each vertex
//! keeps a current-arc pointer that only moves forward during a phase, and
//! vertices proven to be dead ends are removed until the next phase. After
//! an augmentation the path is retracted only up to its first saturated
//! arc, so the untouched prefix is reused by the next search.

use log::trace;
use serde::{Deserialize, Serialize};

use super::level::LevelGraph;
use super::network::{ArcId, Flow, FlowNetwork};
use super::FlowError;
use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::Capacity;
use crate::execution::tracer::{ExecutionTracer, TraceEvent};

/// Counters for one blocking-flow phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    /// Flow pushed during the phase
    pub flow: Flow,
    /// Augmenting paths applied
    pub augmenting_paths: usize,
    /// Vertices removed as dead ends
    pub retreats: usize,
    /// Arc inspections made by the pointer advance
    pub arcs_scanned: usize,
}

/// Reusable blocking-flow search state
#[derive(Debug, Clone)]
pub struct BlockingFlowFinder {
    source: NodeId,
    sink: NodeId,
    epsilon: Capacity,
    /// Current-arc pointer per vertex
    current: Vec<usize>,
    /// Dead-end marks per vertex
    dead: Vec<bool>,
    /// Arcs from the source to the vertex under inspection
    path: Vec<ArcId>,
}

impl BlockingFlowFinder {
    pub fn new(source: NodeId, sink: NodeId, epsilon: Capacity) -> Result<Self, FlowError> {
        if source == sink {
            return Err(FlowError::InvalidTerminals(format!(
                "source and sink are both {}",
                source
            )));
        }
        Ok(Self {
            source,
            sink,
            epsilon,
            current: Vec::new(),
            dead: Vec::new(),
            path: Vec::new(),
        })
    }

    fn reset(&mut self, vertex_count: usize) {
        self.current.clear();
        self.current.resize(vertex_count, 0);
        self.dead.clear();
        self.dead.resize(vertex_count, false);
        self.path.clear();
    }

    /// Saturates the level graph and returns what the phase pushed.
    ///
    /// `levels` must have been built from the current state of `network`.
    pub fn run(
        &mut self,
        network: &mut FlowNetwork,
        levels: &LevelGraph,
        phase: usize,
        mut tracer: Option<&mut ExecutionTracer>,
    ) -> Result<PhaseOutcome, FlowError> {
        self.reset(network.vertex_count());
        let mut outcome = PhaseOutcome::default();

        loop {
            let u = match self.path.last() {
                Some(&arc) => network.arc(arc).to,
                None => self.source,
            };

            if u == self.sink {
                let amount = self
                    .path
                    .iter()
                    .map(|&arc| network.arc(arc).residual)
                    .fold(Flow::INFINITY, Flow::min);
                network.augment(&self.path, amount)?;

                outcome.flow += amount;
                outcome.augmenting_paths += 1;
                trace!("phase {}: pushed {} along {} arcs", phase, amount, self.path.len());

                if let Some(tracer) = tracer.as_deref_mut() {
                    tracer.record(TraceEvent::PathAugmented {
                        phase,
                        path: self.path_vertices(network),
                        amount,
                    });
                }

                let cut = self.retract_point(network);
                self.path.truncate(cut);
                continue;
            }

            match self.advance(network, levels, u, &mut outcome) {
                Some(arc) => self.path.push(arc),
                None => {
                    self.dead[u.0] = true;
                    if u == self.source {
                        break;
                    }

                    outcome.retreats += 1;
                    if let Some(arc) = self.path.pop() {
                        let tail = network.arc(arc).from;
                        self.current[tail.0] += 1;
                    }
                    if let Some(tracer) = tracer.as_deref_mut() {
                        tracer.record(TraceEvent::Retreat { phase, node: u });
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Moves the current-arc pointer of `u` to the next usable arc.
    fn advance(
        &mut self,
        network: &FlowNetwork,
        levels: &LevelGraph,
        u: NodeId,
        outcome: &mut PhaseOutcome,
    ) -> Option<ArcId> {
        let arcs = network.arcs_from(u);
        while let Some(&arc) = arcs.get(self.current[u.0]) {
            outcome.arcs_scanned += 1;
            let head = network.arc(arc).to;
            if !self.dead[head.0] && levels.is_admissible(network, arc) {
                return Some(arc);
            }
            self.current[u.0] += 1;
        }
        None
    }

    /// Length of the path prefix kept after an augmentation: everything
    /// before the first saturated arc.
    fn retract_point(&self, network: &FlowNetwork) -> usize {
        let cut = self
            .path
            .iter()
            .position(|&arc| network.arc(arc).residual <= self.epsilon);
        // the bottleneck arc always saturates
        debug_assert!(cut.is_some(), "augmented path has no saturated arc");
        cut.unwrap_or_else(|| {
            trace!("no saturated arc on a {}-arc path, restarting from the source", self.path.len());
            0
        })
    }

    fn path_vertices(&self, network: &FlowNetwork) -> Vec<NodeId> {
        std::iter::once(self.source)
            .chain(self.path.iter().map(|&arc| network.arc(arc).to))
            .collect()
    }
}
