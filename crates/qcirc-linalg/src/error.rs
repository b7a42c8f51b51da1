//! Error types for the linear-algebra crate.

use thiserror::Error;

/// Errors that can occur in operator and ket arithmetic.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LinalgError {
    /// Two operands have incompatible total dimensions.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// Subsystem dimensions do not multiply to the matrix size.
    #[error("Subsystem dims {dims:?} do not describe a space of size {size}")]
    InvalidDims {
        /// The declared subsystem dimensions.
        dims: Vec<usize>,
        /// The actual size of the data.
        size: usize,
    },

    /// A matrix was not square.
    #[error("Operator must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// A subsystem index is outside the declared subsystems.
    #[error("Subsystem {index} out of range for {num_subsystems} subsystems")]
    SubsystemOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of subsystems available.
        num_subsystems: usize,
    },

    /// A subsystem index appears twice.
    #[error("Subsystem {0} listed more than once")]
    DuplicateSubsystem(usize),

    /// An operator's subsystem does not fit the subsystem it is placed on.
    #[error("Subsystem {index} has dimension {expected}, operator provides {got}")]
    SubsystemDimMismatch {
        /// Subsystem index in the target space.
        index: usize,
        /// Dimension of that subsystem.
        expected: usize,
        /// Dimension the operator provides.
        got: usize,
    },

    /// A basis level exceeds its subsystem dimension.
    #[error("Level {level} out of range for subsystem of dimension {dim}")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Subsystem dimension.
        dim: usize,
    },

    /// Normalization of a zero vector.
    #[error("Cannot normalize a vector of zero norm")]
    ZeroNorm,
}

/// Result type for linear-algebra operations.
pub type LinalgResult<T> = Result<T, LinalgError>;
