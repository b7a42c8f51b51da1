//! Error types for the sim crate.

use qcirc_ir::IrError;
use qcirc_linalg::LinalgError;
use thiserror::Error;

/// Errors produced while simulating a circuit.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimError {
    /// A classically controlled gate read a bit no measurement has written.
    #[error("Classical bit {clbit} is read before any measurement wrote it")]
    UnwrittenClbit {
        /// The unwritten bit.
        clbit: usize,
    },

    /// The initial state does not live on the circuit register.
    #[error("State dimensions {got:?} do not match the register {expected:?}")]
    StateDimension {
        /// Register dimensions of the circuit.
        expected: Vec<usize>,
        /// Dimensions of the supplied state.
        got: Vec<usize>,
    },

    /// A forced measurement outcome has (numerically) zero probability.
    #[error("Outcome {outcome} of measurement '{measurement}' has probability {probability:.3e}")]
    ImpossibleOutcome {
        /// Measurement label.
        measurement: String,
        /// The forced outcome.
        outcome: usize,
        /// Its probability.
        probability: f64,
    },

    /// A stored measurement produced a level that is not a bit.
    #[error("Measurement '{measurement}' gave level {outcome}, which cannot be stored as a bit")]
    NonBinaryOutcome {
        /// Measurement label.
        measurement: String,
        /// The measured level.
        outcome: usize,
    },

    /// Supplied classical bits do not match the classical register.
    #[error("Expected {expected} classical bits, got {got}")]
    ClbitCount {
        /// Classical register size.
        expected: usize,
        /// Number supplied.
        got: usize,
    },

    /// `step` was called before `initialize`.
    #[error("Simulator has not been initialized")]
    NotInitialized,

    /// Invalid simulator configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error from the IR layer.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] IrError),

    /// Error from the linear-algebra layer.
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
