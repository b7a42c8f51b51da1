//! Circuit compilation for qcirc.
//!
//! This crate rewrites [`QubitCircuit`](qcirc_ir::QubitCircuit)s through a
//! sequence of passes managed by a [`PassManager`].
//!
//! # Passes
//!
//! - [`ResolveGates`]: rewrite every gate into a [`Basis`] made of one
//!   entangler and at least two rotation axes
//! - [`AdjacentGates`]: make every gate act on neighbouring qubits using
//!   nearest-neighbour SWAPs
//! - [`RecordUnitary`] / [`EquivalenceCheck`]: verify that compilation kept
//!   the circuit unitary
//!
//! # Example
//!
//! ```rust
//! use qcirc_compile::{Basis, resolve_gates};
//! use qcirc_ir::QubitCircuit;
//!
//! let mut circuit = QubitCircuit::new(2);
//! circuit.snot(0).unwrap();
//! circuit.swap(0, 1).unwrap();
//!
//! let basis = Basis::from_names("CSIGN", &["RX", "RY"]).unwrap();
//! let resolved = resolve_gates(&circuit, &basis).unwrap();
//!
//! let before = circuit.compute_unitary().unwrap();
//! let after = resolved.compute_unitary().unwrap();
//! assert!(before.distance(&after) < 1e-12);
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod unitary;

pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    AdjacentGates, EQUIVALENCE_TOLERANCE, EquivalenceCheck, EquivalenceReport, RecordUnitary,
    ReferenceUnitary, ResolveGates, adjacent_gates, resolve_gates,
};
pub use property::{Basis, PropertySet, RotationAxis, TwoQubitBasis};
pub use unitary::{Unitary2x2, ZyzAngles};
