//! Quantum circuit intermediate representation.
//!
//! This crate holds the operand model and the circuit container that the
//! compiler and simulator work on.
//!
//! # Core Components
//!
//! - **Gates**: [`Gate`] with a [`GateName`] from the standard vocabulary or a
//!   user-defined name, validated by [`GateBuilder`]
//! - **Measurements**: [`Measurement`] in the computational basis with an
//!   optional classical store
//! - **Operations**: [`Operation`], either of the above
//! - **Circuit**: [`QubitCircuit`], an ordered operation list on a register of
//!   qubits or qudits with a per-circuit [`UserGateRegistry`]
//! - **Propagators**: [`gate_sequence_product`] and
//!   [`gate_sequence_product_lazy`] to compose gate matrices
//!
//! # Example: Bell State Unitary
//!
//! ```rust
//! use qcirc_ir::QubitCircuit;
//!
//! let mut circuit = QubitCircuit::new(2);
//! circuit.snot(0).unwrap();
//! circuit.cnot(0, 1).unwrap();
//!
//! let u = circuit.compute_unitary().unwrap();
//! assert!(u.is_unitary(1e-12));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Controls | Targets | Argument |
//! |------|----------|---------|----------|
//! | `X`, `Y`, `Z`, `S`, `T`, `SNOT`, `SQRTNOT` | 0 | 1 | - |
//! | `RX`, `RY`, `RZ`, `PHASEGATE` | 0 | 1 | angle |
//! | `QASMU` | 0 | 1 | three angles |
//! | `CNOT`, `CSIGN`, `CY`, `CZ`, `CS`, `CT` | 1 | 1 | - |
//! | `CRX`, `CRY`, `CRZ`, `CPHASE` | 1 | 1 | angle |
//! | `SWAP`, `ISWAP`, `SQRTSWAP`, `SQRTISWAP`, `BERKELEY` | 0 | 2 | - |
//! | `SWAPALPHA` | 0 | 2 | α |
//! | `TOFFOLI` | 2 | 1 | - |
//! | `FREDKIN` | 1 | 2 | - |
//! | `GLOBALPHASE` | 0 | 0 | angle |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod matrices;
pub mod measurement;
pub mod operation;
pub mod propagator;
pub mod registry;

pub use circuit::{QubitCircuit, RemoveMode, StateKind};
pub use error::{IrError, IrResult};
pub use gate::{ArgKind, ClassicalControl, Gate, GateArg, GateBuilder, GateName, Signature};
pub use measurement::{Measurement, PROBABILITY_TOLERANCE};
pub use operation::Operation;
pub use propagator::{ProductOrder, gate_sequence_product, gate_sequence_product_lazy};
pub use registry::{UserGateFn, UserGateRegistry};
