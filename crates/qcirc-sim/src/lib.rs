//! Circuit simulation for qcirc.
//!
//! A [`CircuitSimulator`] borrows a [`QubitCircuit`](qcirc_ir::QubitCircuit)
//! and evolves a [`QuantumState`] through it, either as a state vector or as
//! a density matrix.
//!
//! # Running
//!
//! - [`CircuitSimulator::run`] follows one trajectory, sampling each
//!   measurement outcome
//! - [`CircuitSimulator::run_statistics`] enumerates every outcome branch with
//!   its probability
//! - [`CircuitSimulator::initialize`] and [`CircuitSimulator::step`] execute
//!   one operation at a time
//!
//! Measurements with a classical store write their outcome into the classical
//! register, which classically controlled gates read.
//!
//! # Example: Bell Pair Statistics
//!
//! ```rust
//! use qcirc_ir::QubitCircuit;
//! use qcirc_linalg::Ket;
//! use qcirc_sim::CircuitExt;
//!
//! let mut circuit = QubitCircuit::with_cbits(2, 2);
//! circuit.snot(0).unwrap();
//! circuit.cnot(0, 1).unwrap();
//! circuit.measure(0, 0).unwrap();
//! circuit.measure(1, 1).unwrap();
//!
//! let result = circuit.run_statistics(Ket::zero_state(&[2, 2])).unwrap();
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.cbits(0), Some(&[Some(0), Some(0)][..]));
//! assert_eq!(result.cbits(1), Some(&[Some(1), Some(1)][..]));
//! ```

pub mod config;
pub mod error;
pub mod ext;
pub mod result;
pub mod simulator;
pub mod state;

pub use config::{PRUNE_TOLERANCE, SimulatorConfig, SimulatorMode};
pub use error::{SimError, SimResult};
pub use ext::CircuitExt;
pub use result::CircuitResult;
pub use simulator::{CircuitSimulator, RunOptions, SimulatorStatus};
pub use state::QuantumState;
