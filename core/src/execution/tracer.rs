//! Execution tracing for algorithm walkthroughs
//!
//! Records the phase structure of a solver run (level graphs, augmenting
//! paths, retreats from dead ends) so a run can be replayed step by step or
//! exported as JSON.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::NodeId;

/// Observable event emitted by a traced run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A level graph was layered from the source
    LevelGraphBuilt {
        phase: usize,
        sink_level: Option<usize>,
        labeled: usize,
        admissible_arcs: usize,
    },
    /// Flow was pushed along a source-to-sink path
    PathAugmented {
        phase: usize,
        path: Vec<NodeId>,
        amount: f64,
    },
    /// A vertex was found to be a dead end and removed for the phase
    Retreat { phase: usize, node: NodeId },
    /// A blocking flow was reached
    PhaseCompleted {
        phase: usize,
        phase_flow: f64,
        total_flow: f64,
    },
    /// The run stopped early because the requested flow was reached
    CutoffReached { total_flow: f64, cutoff: f64 },
    /// The sink became unreachable
    Terminated { phases: usize, total_flow: f64 },
}

impl TraceEvent {
    /// Phase the event belongs to, if any
    pub fn phase(&self) -> Option<usize> {
        match self {
            TraceEvent::LevelGraphBuilt { phase, .. }
            | TraceEvent::PathAugmented { phase, .. }
            | TraceEvent::Retreat { phase, .. }
            | TraceEvent::PhaseCompleted { phase, .. } => Some(*phase),
            TraceEvent::CutoffReached { .. } | TraceEvent::Terminated { .. } => None,
        }
    }
}

/// Event with its position in the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub step: usize,
    pub event: TraceEvent,
}

/// Append-only event log for one or more runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionTracer {
    points: Vec<TracePoint>,
}

impl ExecutionTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        let step = self.points.len();
        self.points.push(TracePoint { step, event });
    }

    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Events recorded during `phase`
    pub fn phase_events(&self, phase: usize) -> impl Iterator<Item = &TraceEvent> + '_ {
        self.points
            .iter()
            .map(|p| &p.event)
            .filter(move |e| e.phase() == Some(phase))
    }

    /// Augmenting paths in the order they were applied
    pub fn augmenting_paths(&self) -> Vec<(&[NodeId], f64)> {
        self.points
            .iter()
            .filter_map(|p| match &p.event {
                TraceEvent::PathAugmented { path, amount, .. } => Some((path.as_slice(), *amount)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.points)
    }
}
