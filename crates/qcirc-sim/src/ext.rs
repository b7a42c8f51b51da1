//! Convenience entry points on [`QubitCircuit`].

use qcirc_ir::QubitCircuit;

use crate::config::{SimulatorConfig, SimulatorMode};
use crate::error::{SimError, SimResult};
use crate::result::CircuitResult;
use crate::simulator::CircuitSimulator;
use crate::state::QuantumState;

/// Run a circuit without building a simulator by hand.
///
/// The mode follows the input: kets evolve as state vectors and density
/// operators as density matrices.
pub trait CircuitExt {
    /// Run one trajectory and return its final state.
    fn run(&self, state: impl Into<QuantumState>) -> SimResult<QuantumState>;

    /// Enumerate every measurement branch.
    fn run_statistics(&self, state: impl Into<QuantumState>) -> SimResult<CircuitResult>;
}

fn config_for(state: &QuantumState) -> SimulatorConfig {
    let mode = match state {
        QuantumState::Ket(_) => SimulatorMode::StateVector,
        QuantumState::DensityMatrix(_) => SimulatorMode::DensityMatrix,
    };
    SimulatorConfig::default().with_mode(mode)
}

impl CircuitExt for QubitCircuit {
    fn run(&self, state: impl Into<QuantumState>) -> SimResult<QuantumState> {
        let state = state.into();
        let mut sim = CircuitSimulator::new(self, config_for(&state))?;
        sim.run(state)?
            .into_final_states()
            .into_iter()
            .next()
            .ok_or(SimError::NotInitialized)
    }

    fn run_statistics(&self, state: impl Into<QuantumState>) -> SimResult<CircuitResult> {
        let state = state.into();
        CircuitSimulator::new(self, config_for(&state))?.run_statistics(state)
    }
}
