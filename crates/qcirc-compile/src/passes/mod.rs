//! Built-in compilation passes.

pub mod adjacent;
pub mod resolve;
pub mod verification;

pub use adjacent::{AdjacentGates, adjacent_gates};
pub use resolve::{ResolveGates, resolve_gates};
pub use verification::{
    EQUIVALENCE_TOLERANCE, EquivalenceCheck, EquivalenceReport, RecordUnitary, ReferenceUnitary,
};
