//! Equivalence verification for compiled circuits.
//!
//! [`RecordUnitary`] stores the unitary of the circuit before any rewriting;
//! [`EquivalenceCheck`] compares the compiled circuit against it.

use qcirc_ir::{Operation, QubitCircuit};
use qcirc_linalg::Operator;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Default accepted Frobenius distance between reference and result.
pub const EQUIVALENCE_TOLERANCE: f64 = 1e-12;

/// Unitary of the circuit as it was before compilation.
#[derive(Debug, Clone)]
pub struct ReferenceUnitary(pub Operator);

/// Outcome of the last equivalence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceReport {
    /// Frobenius distance between reference and compiled unitary.
    pub distance: f64,
}

/// Whether the circuit can be reduced to one unitary at all.
fn is_purely_unitary(circuit: &QubitCircuit) -> bool {
    circuit.operations().iter().all(|op| match op {
        Operation::Gate(g) => g.classical_controls().is_none(),
        Operation::Measurement(_) => false,
    })
}

/// Analysis pass that records the current circuit unitary.
pub struct RecordUnitary;

impl Pass for RecordUnitary {
    fn name(&self) -> &'static str {
        "RecordUnitary"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut QubitCircuit, properties: &mut PropertySet) -> CompileResult<()> {
        properties.insert(ReferenceUnitary(circuit.compute_unitary()?));
        Ok(())
    }

    fn should_run(&self, circuit: &QubitCircuit, _properties: &PropertySet) -> bool {
        is_purely_unitary(circuit)
    }
}

/// Analysis pass that fails when the circuit drifted from the recorded
/// reference unitary.
pub struct EquivalenceCheck {
    tolerance: f64,
}

impl EquivalenceCheck {
    /// Check with [`EQUIVALENCE_TOLERANCE`].
    pub fn new() -> Self {
        Self::with_tolerance(EQUIVALENCE_TOLERANCE)
    }

    /// Check with a custom tolerance.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for EquivalenceCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for EquivalenceCheck {
    fn name(&self) -> &'static str {
        "EquivalenceCheck"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut QubitCircuit, properties: &mut PropertySet) -> CompileResult<()> {
        let reference = properties
            .get::<ReferenceUnitary>()
            .ok_or(CompileError::MissingReference)?;
        let distance = circuit.compute_unitary()?.distance(&reference.0);
        debug!("Equivalence distance {distance:.3e}");

        properties.insert(EquivalenceReport { distance });
        if distance > self.tolerance {
            return Err(CompileError::EquivalenceFailed {
                distance,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }

    fn should_run(&self, circuit: &QubitCircuit, _properties: &PropertySet) -> bool {
        is_purely_unitary(circuit)
    }
}
