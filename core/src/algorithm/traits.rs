//! Core algorithm trait definitions for levelflow
//!
//! This module establishes the trait layer shared by the solvers in the
//! crate: a typed parameter surface, execution metrics and a lightweight
//! profiler used to time runs.
//!
//! # Key Design Principles
//! - Dense node identifiers that cannot be mixed with other integers
//! - String parameters validated against typed constraints
//! - Deterministic behavior for given inputs
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{self, Debug, Display};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Universal algorithm identifier for type-safe dispatch
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Node identifier ensuring type safety and preventing mixing with other numeric types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub constraints: Option<ParameterConstraints>,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    Float,
    Boolean,
}

/// Parameter constraints for validating algorithm parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ParameterConstraints {
    /// Checks a numeric value against the bounds.
    pub fn check(&self, name: &str, value: f64) -> Result<(), AlgorithmError> {
        if value.is_nan() {
            return Err(AlgorithmError::invalid_parameter(name, "value is NaN"));
        }
        if let Some(min) = self.min {
            if value < min {
                return Err(AlgorithmError::invalid_parameter(
                    name,
                    format!("{} is below the minimum {}", value, min),
                ));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(AlgorithmError::invalid_parameter(
                    name,
                    format!("{} exceeds the maximum {}", value, max),
                ));
            }
        }
        Ok(())
    }
}

/// Error types for the algorithm trait layer
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl AlgorithmError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        AlgorithmError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Algorithm execution metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    pub steps_executed: usize,
    pub nodes_explored: usize,
    pub execution_time: Duration,
}

/// Algorithm complexity information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmComplexity {
    pub time_complexity: String,
    pub space_complexity: String,
    pub best_case: String,
    pub average_case: String,
    pub worst_case: String,
}

/// Main algorithm trait
///
/// # Invariants
/// - State isolation between runs
/// - Deterministic behavior for given inputs
pub trait Algorithm: Debug + Send + Sync {
    /// Returns the algorithm's unique identifier
    fn id(&self) -> AlgorithmId;

    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., max_flow)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description with complexity guarantees
    fn description(&self) -> String;

    /// Returns the algorithm's asymptotic complexity in Big-O notation
    fn complexity(&self) -> AlgorithmComplexity;

    /// Returns supported parameters with type information
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;
}

/// Wall-clock and counter profiling for a single run
#[derive(Debug, Default)]
pub struct AlgorithmProfiler {
    metrics: AlgorithmMetrics,
    start_time: Option<Instant>,
}

impl AlgorithmProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.metrics.execution_time = start.elapsed();
        }
    }

    pub fn record_nodes_explored(&mut self, count: usize) {
        self.metrics.nodes_explored += count;
    }

    pub fn record_step(&mut self) {
        self.metrics.steps_executed += 1;
    }

    pub fn get_metrics(&self) -> AlgorithmMetrics {
        self.metrics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_id_uniqueness() {
        let id1 = AlgorithmId::new("dinitz");
        let id2 = AlgorithmId::new("edmonds_karp");
        let id3 = AlgorithmId::new("dinitz");

        assert_ne!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(id1.as_str(), "dinitz");
    }

    #[test]
    fn test_node_id_type_safety() {
        let node1 = NodeId(42);
        let node2 = NodeId(42);
        let node3 = NodeId(43);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
        assert_eq!(node1.as_usize(), 42);
        assert_eq!(node1.to_string(), "#42");
    }

    #[test]
    fn test_parameter_constraints() {
        let constraints = ParameterConstraints {
            min: Some(0.0),
            max: Some(10.0),
        };

        assert!(constraints.check("weight", 1.5).is_ok());
        assert!(constraints.check("weight", -0.5).is_err());
        assert!(constraints.check("weight", 10.5).is_err());
        assert!(constraints.check("weight", f64::NAN).is_err());
    }

    #[test]
    fn test_profiler_counters() {
        let mut profiler = AlgorithmProfiler::new();
        profiler.start();
        profiler.record_step();
        profiler.record_step();
        profiler.record_nodes_explored(3);
        profiler.record_nodes_explored(1);
        profiler.stop();

        let metrics = profiler.get_metrics();
        assert_eq!(metrics.steps_executed, 2);
        assert_eq!(metrics.nodes_explored, 4);
    }
}
