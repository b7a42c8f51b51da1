//! Simulator configuration.
//!
//! A [`SimulatorConfig`] is built in code or loaded from YAML:
//!
//! ```yaml
//! mode: density_matrix_simulator
//! precompute_unitary: true
//! prune_tolerance: 1.0e-12
//! ```
//!
//! Missing fields take their defaults.

use std::path::Path;

use qcirc_ir::PROBABILITY_TOLERANCE;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Outcomes with probability below this are pruned by default.
pub const PRUNE_TOLERANCE: f64 = PROBABILITY_TOLERANCE;

/// Representation the simulator evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimulatorMode {
    /// Pure states as kets.
    #[default]
    #[serde(rename = "state_vector_simulator", alias = "state_vector")]
    StateVector,
    /// Density operators.
    #[serde(rename = "density_matrix_simulator", alias = "density_matrix")]
    DensityMatrix,
}

/// Configuration of a [`CircuitSimulator`](crate::CircuitSimulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Ket or density-matrix evolution.
    #[serde(default)]
    pub mode: SimulatorMode,

    /// Multiply runs of unconditioned gates into one unitary up front.
    #[serde(default)]
    pub precompute_unitary: bool,

    /// Measurement outcomes below this probability are dropped.
    #[serde(default = "default_prune_tolerance")]
    pub prune_tolerance: f64,
}

fn default_prune_tolerance() -> f64 {
    PRUNE_TOLERANCE
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            mode: SimulatorMode::default(),
            precompute_unitary: false,
            prune_tolerance: default_prune_tolerance(),
        }
    }
}

impl SimulatorConfig {
    /// Default configuration: state vectors, no precomputation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SimulatorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable unitary precomputation.
    #[must_use]
    pub fn with_precompute_unitary(mut self, enabled: bool) -> Self {
        self.precompute_unitary = enabled;
        self
    }

    /// Set the pruning threshold.
    #[must_use]
    pub fn with_prune_tolerance(mut self, tolerance: f64) -> Self {
        self.prune_tolerance = tolerance;
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let config: SimulatorConfig =
            serde_yaml_ng::from_str(yaml).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SimError::Config(e.to_string()))?;
        Self::from_yaml_str(&contents)
    }

    /// Check that the values make sense.
    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..1.0).contains(&self.prune_tolerance) {
            return Err(SimError::Config(format!(
                "prune_tolerance must lie in [0, 1), got {}",
                self.prune_tolerance
            )));
        }
        Ok(())
    }
}
