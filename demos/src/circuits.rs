//! Circuits shared by the demos.

use std::f64::consts::PI;

use qcirc_ir::{Gate, IrResult, QubitCircuit};

/// Teleport qubit 0 onto qubit 2.
///
/// Qubits 1 and 2 share a Bell pair; the two measurements write bits 0 and 1,
/// which drive the `Z` and `X` corrections on qubit 2.
pub fn teleportation() -> IrResult<QubitCircuit> {
    let mut qc = QubitCircuit::with_cbits(3, 2);
    qc.snot(1)?.cnot(1, 2)?;
    qc.cnot(0, 1)?.snot(0)?;
    qc.measure(0, 0)?.measure(1, 1)?;
    qc.add_gate(
        Gate::builder("X")
            .target(2)
            .classical_controls([1])
            .build()?,
    )?;
    qc.add_gate(
        Gate::builder("Z")
            .target(2)
            .classical_controls([0])
            .build()?,
    )?;
    Ok(qc)
}

/// A gate mix touching every rewrite rule, on `num_qubits >= 3` qubits.
///
/// Multi-qubit gates span the outermost qubits so that adjacency
/// normalization has work to do.
pub fn resolution_showcase(num_qubits: usize) -> IrResult<QubitCircuit> {
    let last = num_qubits.saturating_sub(1);
    let mut qc = QubitCircuit::new(num_qubits);
    qc.snot(0)?;
    qc.add_gates([
        Gate::with_arg("RX", &[1], PI / 3.0)?,
        Gate::new("T", &[2])?,
        Gate::builder("CPHASE").control(0).target(last).arg(PI / 4.0).build()?,
        Gate::new("ISWAP", &[0, last])?,
        Gate::controlled("TOFFOLI", &[0, 1], &[last])?,
        Gate::controlled("FREDKIN", &[last], &[0, 1])?,
        Gate::new("SWAP", &[1, last])?,
        Gate::controlled("CY", &[2], &[0])?,
        Gate::with_arg("GLOBALPHASE", &[], PI / 7.0)?,
    ])?;
    Ok(qc)
}
