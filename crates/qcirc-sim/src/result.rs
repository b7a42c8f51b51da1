//! Outcome ensembles of a simulation.

use qcirc_linalg::Operator;
use num_complex::Complex64;

use crate::state::QuantumState;

/// The final states reached by a simulation, one per measurement branch.
///
/// [`CircuitSimulator::run`](crate::CircuitSimulator::run) yields a single
/// branch; [`run_statistics`](crate::CircuitSimulator::run_statistics) yields
/// every branch whose probability survived pruning.
#[derive(Debug, Clone, Default)]
pub struct CircuitResult {
    final_states: Vec<QuantumState>,
    probabilities: Vec<f64>,
    cbits: Vec<Vec<Option<u8>>>,
}

impl CircuitResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one branch.
    pub fn push(&mut self, state: QuantumState, probability: f64, cbits: Vec<Option<u8>>) {
        self.final_states.push(state);
        self.probabilities.push(probability);
        self.cbits.push(cbits);
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.final_states.len()
    }

    /// Whether no branch was recorded.
    pub fn is_empty(&self) -> bool {
        self.final_states.is_empty()
    }

    /// Final state of every branch.
    pub fn final_states(&self) -> &[QuantumState] {
        &self.final_states
    }

    /// Final state of branch `i`.
    pub fn final_state(&self, i: usize) -> Option<&QuantumState> {
        self.final_states.get(i)
    }

    /// Consume the result, keeping only the final states.
    pub fn into_final_states(self) -> Vec<QuantumState> {
        self.final_states
    }

    /// Probability of every branch.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of branch `i`.
    pub fn probability(&self, i: usize) -> Option<f64> {
        self.probabilities.get(i).copied()
    }

    /// Classical register of every branch.
    pub fn all_cbits(&self) -> &[Vec<Option<u8>>] {
        &self.cbits
    }

    /// Classical register of branch `i`; unwritten bits are `None`.
    pub fn cbits(&self, i: usize) -> Option<&[Option<u8>]> {
        self.cbits.get(i).map(Vec::as_slice)
    }

    /// The probability-weighted mixture `Σ pᵢ ρᵢ` of all branches.
    pub fn mixed_state(&self) -> Option<Operator> {
        let first = self.final_states.first()?;
        let mut rho = Operator::zeros(first.dims());
        for (state, &p) in self.final_states.iter().zip(&self.probabilities) {
            rho = &rho + &state.to_density().scale(Complex64::new(p, 0.0));
        }
        Some(rho)
    }
}
