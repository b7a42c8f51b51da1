//! Nearest-neighbour normalization.

use qcirc_ir::{Gate, GateName, Operation, QubitCircuit};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrites gates on non-contiguous qubits with nearest-neighbour SWAPs.
pub struct AdjacentGates;

impl Pass for AdjacentGates {
    fn name(&self) -> &'static str {
        "AdjacentGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut QubitCircuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let rewritten = adjacent_operations(circuit)?;
        circuit.take_operations();
        for op in rewritten {
            circuit.add_operation(op)?;
        }
        Ok(())
    }
}

/// Return an equivalent circuit in which every gate acts on a contiguous
/// block of qubits.
///
/// A gate on, say, qubits `[0, 3]` becomes `SWAP(2,3) SWAP(1,2)`, the gate on
/// `[0, 1]`, then the same swaps in reverse. Roles and operand order are kept,
/// so the full-register unitary is unchanged.
pub fn adjacent_gates(circuit: &QubitCircuit) -> CompileResult<QubitCircuit> {
    let mut adjacent = circuit.clone();
    AdjacentGates.run(&mut adjacent, &mut PropertySet::new())?;
    Ok(adjacent)
}

fn is_contiguous(sorted: &[usize]) -> bool {
    sorted.windows(2).all(|w| w[1] == w[0] + 1)
}

fn adjacent_operations(circuit: &QubitCircuit) -> CompileResult<Vec<Operation>> {
    let mut out = Vec::with_capacity(circuit.len());
    let mut rewritten = 0_usize;

    for op in circuit.operations() {
        let Operation::Gate(gate) = op else {
            out.push(op.clone());
            continue;
        };
        let mut sorted = gate.qubits();
        sorted.sort_unstable();
        if is_contiguous(&sorted) {
            out.push(op.clone());
            continue;
        }

        // Shuttle the j-th lowest qubit down to `base + j`.
        let base = sorted[0];
        let mut swaps: Vec<Gate> = vec![];
        for (j, &q) in sorted.iter().enumerate().skip(1) {
            for k in (base + j + 1..=q).rev() {
                swaps.push(Gate::new(GateName::Swap, &[k - 1, k])?);
            }
        }
        let moved = gate.map_qubits(|q| base + sorted.iter().position(|&s| s == q).unwrap_or(0));

        out.extend(swaps.iter().cloned().map(Operation::Gate));
        out.push(Operation::Gate(moved));
        out.extend(swaps.into_iter().rev().map(Operation::Gate));
        rewritten += 1;
    }

    debug!("Made {rewritten} gates nearest-neighbour");
    Ok(out)
}
