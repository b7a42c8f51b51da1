//! Dense linear algebra for quantum circuits.
//!
//! This crate provides the small set of matrix primitives the circuit IR,
//! compiler and simulator are built on:
//!
//! - [`Operator`]: square complex matrix tagged with subsystem dimensions
//! - [`Ket`]: complex state vector tagged with subsystem dimensions
//! - [`expand_operator`]: embed a local operator into a larger register
//! - [`random`]: Haar-random kets and unitaries
//!
//! Subsystem 0 is always the most significant tensor factor.
//!
//! # Example
//!
//! ```rust
//! use qcirc_linalg::{Ket, Operator};
//!
//! let x = Operator::from_real(vec![2], &[0.0, 1.0, 1.0, 0.0]).unwrap();
//! let x1 = x.expand(&[2, 2], &[1]).unwrap();
//! let out = x1.apply(&Ket::basis(&[2, 2], &[0, 0]).unwrap()).unwrap();
//! assert_eq!(out, Ket::basis(&[2, 2], &[0, 1]).unwrap());
//! ```

pub mod error;
pub mod ket;
pub mod operator;
pub mod random;

pub use error::{LinalgError, LinalgResult};
pub use ket::Ket;
pub use operator::Operator;

pub use num_complex::Complex64;

/// Embed `op` into a register with subsystem dimensions `dims`, acting on
/// `targets` in the order given.
pub fn expand_operator(op: &Operator, dims: &[usize], targets: &[usize]) -> LinalgResult<Operator> {
    op.expand(dims, targets)
}
