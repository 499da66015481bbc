//! Solver configuration

use serde::{Deserialize, Serialize};

use super::network::Flow;
use crate::algorithm::traits::{AlgorithmError, ParameterConstraints};
use crate::data_structures::graph::Capacity;

/// Default residual tolerance
pub const DEFAULT_EPSILON: Capacity = 1e-12;

/// Tunables for a max-flow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxFlowConfig {
    /// Stop after the first phase whose total reaches this value
    pub cutoff: Option<Flow>,
    /// Residual capacities at or below this are treated as saturated
    pub epsilon: Capacity,
    /// Record phase events into an execution trace
    pub trace: bool,
}

impl Default for MaxFlowConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            epsilon: DEFAULT_EPSILON,
            trace: false,
        }
    }
}

impl MaxFlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cutoff(mut self, cutoff: Flow) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn with_epsilon(mut self, epsilon: Capacity) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Parses and validates a JSON document; absent fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, AlgorithmError> {
        serde_json::to_string(self).map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AlgorithmError> {
        if let Some(cutoff) = self.cutoff {
            cutoff_constraints().check("cutoff", cutoff)?;
        }
        epsilon_constraints().check("epsilon", self.epsilon)
    }
}

pub(crate) fn cutoff_constraints() -> ParameterConstraints {
    ParameterConstraints {
        min: Some(0.0),
        ..ParameterConstraints::default()
    }
}

pub(crate) fn epsilon_constraints() -> ParameterConstraints {
    ParameterConstraints {
        min: Some(0.0),
        max: Some(1.0),
        ..ParameterConstraints::default()
    }
}
