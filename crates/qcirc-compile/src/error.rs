//! Error types for the compilation crate.

use qcirc_ir::IrError;
use qcirc_linalg::LinalgError;
use thiserror::Error;

/// Errors that can occur while compiling a circuit.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CompileError {
    /// No rewrite rule brings this gate closer to the target basis.
    #[error("Gate '{gate}' cannot be decomposed into basis {basis}")]
    NoDecomposition {
        /// Name of the gate.
        gate: String,
        /// The requested basis.
        basis: String,
    },

    /// A basis was requested that cannot express every single-qubit gate.
    #[error("Invalid basis: {0}")]
    InvalidBasis(String),

    /// A pass needs a target basis but none was set.
    #[error("Missing target basis in property set")]
    MissingBasis,

    /// The equivalence check ran without a recorded reference unitary.
    #[error("Missing reference unitary in property set")]
    MissingReference,

    /// The compiled circuit no longer implements the reference unitary.
    #[error("Compiled circuit differs from the reference by {distance:.3e} (tolerance {tolerance:.1e})")]
    EquivalenceFailed {
        /// Frobenius distance between the two unitaries.
        distance: f64,
        /// Accepted distance.
        tolerance: f64,
    },

    /// Error from the IR layer.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// Error from the linear-algebra layer.
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
