//! Error types for the IR crate.

use qcirc_linalg::LinalgError;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum IrError {
    /// A gate violates its construction invariants.
    #[error("Invalid gate '{gate}': {reason}")]
    InvalidGate {
        /// Name of the gate.
        gate: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A measurement violates its construction invariants.
    #[error("Invalid measurement '{name}': {reason}")]
    InvalidMeasurement {
        /// Name of the measurement.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Qubit index outside the register.
    #[error("Qubit {qubit} out of range for a register of {num_qubits} qubits")]
    QubitOutOfRange {
        /// The offending index.
        qubit: usize,
        /// Register size.
        num_qubits: usize,
    },

    /// Classical bit index outside the classical register.
    #[error("Classical bit {clbit} out of range for {num_cbits} classical bits")]
    ClbitOutOfRange {
        /// The offending index.
        clbit: usize,
        /// Classical register size.
        num_cbits: usize,
    },

    /// A spliced circuit does not fit the destination register.
    #[error(
        "Cannot place a {width}-qubit circuit at qubit {start} of a {num_qubits}-qubit register"
    )]
    RegisterOverflow {
        /// First destination qubit.
        start: usize,
        /// Width of the circuit being added.
        width: usize,
        /// Destination register size.
        num_qubits: usize,
    },

    /// Operation index outside the operation list.
    #[error("Operation index {index} out of range for {len} operations")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of operations.
        len: usize,
    },

    /// A user gate name has no registered matrix function.
    #[error("Unknown gate '{0}': no matrix function registered")]
    UnknownGate(String),

    /// A circuit cannot be reduced to a single unitary.
    #[error("Circuit is not unitary: {0}")]
    NotUnitary(String),

    /// Register dimensions are malformed.
    #[error("Invalid register dimensions {0:?}: every subsystem needs dimension >= 2")]
    InvalidDimensions(Vec<usize>),

    /// A product over an empty operator sequence.
    #[error("Cannot compose an empty gate sequence")]
    EmptySequence,

    /// Error from the linear-algebra layer.
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

impl IrError {
    pub(crate) fn invalid_gate(gate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGate {
            gate: gate.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
