//! Quantum states evolved by the simulator.

use num_complex::Complex64;
use qcirc_linalg::{Ket, LinalgResult, Operator};

/// A pure or mixed state on the circuit register.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumState {
    /// A state vector.
    Ket(Ket),
    /// A density operator.
    DensityMatrix(Operator),
}

impl QuantumState {
    /// Subsystem dimensions.
    pub fn dims(&self) -> &[usize] {
        match self {
            QuantumState::Ket(ket) => ket.dims(),
            QuantumState::DensityMatrix(rho) => rho.dims(),
        }
    }

    /// The ket, if this is a pure state vector.
    pub fn as_ket(&self) -> Option<&Ket> {
        match self {
            QuantumState::Ket(ket) => Some(ket),
            QuantumState::DensityMatrix(_) => None,
        }
    }

    /// The density operator, if this is one.
    pub fn as_density(&self) -> Option<&Operator> {
        match self {
            QuantumState::DensityMatrix(rho) => Some(rho),
            QuantumState::Ket(_) => None,
        }
    }

    /// Density operator of this state; `|ψ⟩⟨ψ|` for kets.
    pub fn to_density(&self) -> Operator {
        match self {
            QuantumState::Ket(ket) => ket.to_density(),
            QuantumState::DensityMatrix(rho) => rho.clone(),
        }
    }

    /// Promote a ket to a density operator; density operators are kept.
    #[must_use]
    pub fn into_density(self) -> Self {
        match self {
            QuantumState::Ket(ket) => QuantumState::DensityMatrix(ket.to_density()),
            rho @ QuantumState::DensityMatrix(_) => rho,
        }
    }

    /// Evolve by a full-register unitary: `Uψ` or `UρU†`.
    pub fn evolve(&self, u: &Operator) -> LinalgResult<Self> {
        Ok(match self {
            QuantumState::Ket(ket) => QuantumState::Ket(u.apply(ket)?),
            QuantumState::DensityMatrix(rho) => QuantumState::DensityMatrix(u.sandwich(rho)?),
        })
    }

    /// Probability of the outcome with full-register projector `p`.
    pub fn probability(&self, p: &Operator) -> LinalgResult<f64> {
        Ok(match self {
            QuantumState::Ket(ket) => p.apply(ket)?.norm().powi(2),
            QuantumState::DensityMatrix(rho) => p.sandwich(rho)?.trace().re,
        })
    }

    /// Post-measurement state for projector `p` whose outcome has
    /// probability `probability > 0`.
    pub fn collapse(&self, p: &Operator, probability: f64) -> LinalgResult<Self> {
        Ok(match self {
            QuantumState::Ket(ket) => QuantumState::Ket(
                p.apply(ket)?
                    .scale(Complex64::new(1.0 / probability.sqrt(), 0.0)),
            ),
            QuantumState::DensityMatrix(rho) => QuantumState::DensityMatrix(
                p.sandwich(rho)?
                    .scale(Complex64::new(1.0 / probability, 0.0)),
            ),
        })
    }
}

impl From<Ket> for QuantumState {
    fn from(ket: Ket) -> Self {
        QuantumState::Ket(ket)
    }
}

impl From<Operator> for QuantumState {
    fn from(rho: Operator) -> Self {
        QuantumState::DensityMatrix(rho)
    }
}
