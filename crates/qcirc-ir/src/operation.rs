//! Circuit operations: gates or measurements.

use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::measurement::Measurement;

/// One entry of a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// A unitary gate.
    Gate(Gate),
    /// A projective measurement.
    Measurement(Measurement),
}

impl Operation {
    /// Whether this operation is a unitary gate.
    pub fn is_unitary(&self) -> bool {
        matches!(self, Operation::Gate(_))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Operation::Gate(g) => g.name().as_str(),
            Operation::Measurement(m) => m.name(),
        }
    }

    /// Target qubits.
    pub fn targets(&self) -> &[usize] {
        match self {
            Operation::Gate(g) => g.targets(),
            Operation::Measurement(m) => m.targets(),
        }
    }

    /// All qubits touched.
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Operation::Gate(g) => g.qubits(),
            Operation::Measurement(m) => m.targets().to_vec(),
        }
    }

    /// Classical bits read or written.
    pub fn clbits(&self) -> Vec<usize> {
        match self {
            Operation::Gate(g) => g
                .classical_controls()
                .map(|c| c.bits().to_vec())
                .unwrap_or_default(),
            Operation::Measurement(m) => m.classical_store().into_iter().collect(),
        }
    }

    /// The gate, if this is one.
    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Operation::Gate(g) => Some(g),
            Operation::Measurement(_) => None,
        }
    }

    /// The measurement, if this is one.
    pub fn as_measurement(&self) -> Option<&Measurement> {
        match self {
            Operation::Measurement(m) => Some(m),
            Operation::Gate(_) => None,
        }
    }

    /// Shift every qubit index by `offset`.
    pub(crate) fn shifted(&self, offset: usize) -> Self {
        match self {
            Operation::Gate(g) => Operation::Gate(g.map_qubits(|q| q + offset)),
            Operation::Measurement(m) => Operation::Measurement(m.shifted(offset)),
        }
    }
}

impl From<Gate> for Operation {
    fn from(gate: Gate) -> Self {
        Operation::Gate(gate)
    }
}

impl From<Measurement> for Operation {
    fn from(measurement: Measurement) -> Self {
        Operation::Measurement(measurement)
    }
}
