//! Gate resolution into a restricted universal basis.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use qcirc_ir::{Gate, GateName, Operation, QubitCircuit, UserGateRegistry, matrices};
use qcirc_linalg::Operator;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Basis, PropertySet, RotationAxis, TwoQubitBasis};
use crate::unitary::Unitary2x2;

/// Rewrites every gate into the basis stored in the property set.
pub struct ResolveGates;

impl Pass for ResolveGates {
    fn name(&self) -> &'static str {
        "ResolveGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut QubitCircuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties.basis.as_ref().ok_or(CompileError::MissingBasis)?;
        resolve_in_place(circuit, basis)
    }

    fn should_run(&self, _circuit: &QubitCircuit, properties: &PropertySet) -> bool {
        properties.basis.is_some()
    }
}

/// Return an equivalent circuit whose gates are all in `basis`.
///
/// Measurements are kept. Every emitted gate inherits the classical controls
/// of the gate it replaces. Fails with [`CompileError::NoDecomposition`] for
/// a gate that has no rewrite towards the basis.
pub fn resolve_gates(circuit: &QubitCircuit, basis: &Basis) -> CompileResult<QubitCircuit> {
    let mut resolved = circuit.clone();
    resolve_in_place(&mut resolved, basis)?;
    Ok(resolved)
}

fn resolve_in_place(circuit: &mut QubitCircuit, basis: &Basis) -> CompileResult<()> {
    let mut resolved: Vec<Operation> = Vec::with_capacity(circuit.len());
    for op in circuit.operations() {
        match op {
            Operation::Gate(gate) => resolve_gate(gate, basis, circuit.user_gates(), &mut resolved)?,
            Operation::Measurement(_) => resolved.push(op.clone()),
        }
    }

    debug!(
        "Resolved {} operations into {} over {}",
        circuit.len(),
        resolved.len(),
        basis
    );
    circuit.take_operations();
    for op in resolved {
        circuit.add_operation(op)?;
    }
    Ok(())
}

/// Expand one gate depth-first until every piece is in the basis.
fn resolve_gate(
    gate: &Gate,
    basis: &Basis,
    registry: &UserGateRegistry,
    out: &mut Vec<Operation>,
) -> CompileResult<()> {
    let mut pending = vec![gate.clone()];
    while let Some(gate) = pending.pop() {
        if basis.contains(gate.name()) {
            out.push(gate.into());
            continue;
        }
        let classical = gate.classical_controls().cloned();
        let replacement = rewrite(&gate, basis, registry)?;
        pending.extend(
            replacement
                .into_iter()
                .rev()
                .map(|g| g.with_classical_controls(classical.clone())),
        );
    }
    Ok(())
}

fn no_decomposition(gate: &Gate, basis: &Basis) -> CompileError {
    CompileError::NoDecomposition {
        gate: gate.name().to_string(),
        basis: basis.to_string(),
    }
}

/// One rewrite step. The result is in time order.
fn rewrite(gate: &Gate, basis: &Basis, registry: &UserGateRegistry) -> CompileResult<Vec<Gate>> {
    let controls = gate.controls();
    let targets = gate.targets();
    match gate.name() {
        GateName::Rx | GateName::Ry | GateName::Rz => {
            let axis = RotationAxis::of(gate.name()).ok_or_else(|| no_decomposition(gate, basis))?;
            change_axis(axis, gate.scalar_arg().unwrap_or_default(), targets[0], basis)
                .ok_or_else(|| no_decomposition(gate, basis))?
        }

        GateName::Cnot => cnot_to(basis.two_qubit(), controls[0], targets[0]),

        GateName::Cz if basis.two_qubit() == TwoQubitBasis::Csign => {
            Ok(vec![Gate::controlled(GateName::Csign, controls, targets)?])
        }

        GateName::Csign
        | GateName::Cz
        | GateName::Cy
        | GateName::Cs
        | GateName::Ct
        | GateName::Crx
        | GateName::Cry
        | GateName::Crz
        | GateName::Cphase => {
            let u = controlled_target_matrix(gate)?;
            let u = Unitary2x2::from_operator(&u).ok_or_else(|| no_decomposition(gate, basis))?;
            controlled_u(&u, controls[0], targets[0])
        }

        GateName::Swap => swap(targets[0], targets[1]),
        GateName::Iswap => iswap(targets[0], targets[1]),
        GateName::Toffoli => toffoli(controls[0], controls[1], targets[0]),
        GateName::Fredkin => fredkin(controls[0], targets[0], targets[1]),

        GateName::SqrtSwap
        | GateName::SqrtIswap
        | GateName::Berkeley
        | GateName::SwapAlpha
        | GateName::GlobalPhase => Err(no_decomposition(gate, basis)),

        GateName::User(_) if controls.is_empty() && targets.len() == 1 => {
            single_qubit(gate, registry, basis)
        }
        GateName::User(_) => Err(no_decomposition(gate, basis)),

        _ => single_qubit(gate, registry, basis),
    }
}

fn rot(axis: RotationAxis, angle: f64, qubit: usize) -> CompileResult<Gate> {
    Ok(Gate::with_arg(axis.gate_name(), &[qubit], angle)?)
}

fn cnot(control: usize, target: usize) -> CompileResult<Gate> {
    Ok(Gate::controlled(GateName::Cnot, &[control], &[target])?)
}

fn global_phase(angle: f64) -> CompileResult<Gate> {
    Ok(Gate::builder(GateName::GlobalPhase).arg(angle).build()?)
}

fn one(name: GateName, qubit: usize) -> CompileResult<Gate> {
    Ok(Gate::new(name, &[qubit])?)
}

/// Express a rotation about a missing axis by conjugating with quarter turns
/// about the two allowed ones. `None` when those are not both allowed.
fn change_axis(
    axis: RotationAxis,
    angle: f64,
    qubit: usize,
    basis: &Basis,
) -> Option<CompileResult<Vec<Gate>>> {
    // RZ = RX(π/2) RY RX(-π/2), RY = RZ(π/2) RX RZ(-π/2), RX = RY(π/2) RZ RY(-π/2)
    let (frame, inner) = match axis {
        RotationAxis::Z => (RotationAxis::X, RotationAxis::Y),
        RotationAxis::Y => (RotationAxis::Z, RotationAxis::X),
        RotationAxis::X => (RotationAxis::Y, RotationAxis::Z),
    };
    if !basis.allows_rotation(frame) || !basis.allows_rotation(inner) {
        return None;
    }
    Some(
        [
            rot(frame, -FRAC_PI_2, qubit),
            rot(inner, angle, qubit),
            rot(frame, FRAC_PI_2, qubit),
        ]
        .into_iter()
        .collect(),
    )
}

/// ZYZ Euler decomposition of a single-qubit gate.
fn single_qubit(
    gate: &Gate,
    registry: &UserGateRegistry,
    basis: &Basis,
) -> CompileResult<Vec<Gate>> {
    let op = gate.local_operator(registry)?;
    let u = Unitary2x2::from_operator(&op).ok_or_else(|| no_decomposition(gate, basis))?;
    let angles = u.zyz();
    let q = gate.targets()[0];
    Ok(vec![
        rot(RotationAxis::Z, angles.delta, q)?,
        rot(RotationAxis::Y, angles.gamma, q)?,
        rot(RotationAxis::Z, angles.beta, q)?,
        global_phase(angles.alpha)?,
    ])
}

/// The single-qubit matrix a standard controlled gate applies to its target.
fn controlled_target_matrix(gate: &Gate) -> CompileResult<Operator> {
    let angle = gate.scalar_arg().unwrap_or_default();
    let op = match gate.name() {
        GateName::Csign | GateName::Cz => matrices::z(),
        GateName::Cy => matrices::y(),
        GateName::Cs => matrices::s(),
        GateName::Ct => matrices::t(),
        GateName::Crx => matrices::rx(angle),
        GateName::Cry => matrices::ry(angle),
        GateName::Crz => matrices::rz(angle),
        GateName::Cphase => matrices::phasegate(angle),
        other => return Err(qcirc_ir::IrError::UnknownGate(other.to_string()).into()),
    };
    Ok(op?)
}

/// Controlled-U with two CNOTs: `U = e^{iα} A X B X C` with `ABC = I`, and
/// the phase `e^{iα}` moved onto the control.
fn controlled_u(u: &Unitary2x2, control: usize, target: usize) -> CompileResult<Vec<Gate>> {
    let a = u.zyz();
    Ok(vec![
        rot(RotationAxis::Z, (a.delta - a.beta) / 2.0, target)?,
        cnot(control, target)?,
        rot(RotationAxis::Z, -(a.delta + a.beta) / 2.0, target)?,
        rot(RotationAxis::Y, -a.gamma / 2.0, target)?,
        cnot(control, target)?,
        rot(RotationAxis::Y, a.gamma / 2.0, target)?,
        rot(RotationAxis::Z, a.beta, target)?,
        rot(RotationAxis::Z, a.alpha, control)?,
        global_phase(a.alpha / 2.0)?,
    ])
}

/// CNOT expressed with the chosen entangler.
fn cnot_to(entangler: TwoQubitBasis, c: usize, t: usize) -> CompileResult<Vec<Gate>> {
    let pair = [c, t];
    match entangler {
        TwoQubitBasis::Cnot => Ok(vec![cnot(c, t)?]),
        TwoQubitBasis::Csign => Ok(vec![
            one(GateName::Snot, t)?,
            Gate::controlled(GateName::Csign, &[c], &[t])?,
            one(GateName::Snot, t)?,
        ]),
        TwoQubitBasis::Iswap => Ok(vec![
            global_phase(FRAC_PI_4)?,
            Gate::new(GateName::Iswap, &pair)?,
            rot(RotationAxis::Z, -FRAC_PI_2, t)?,
            rot(RotationAxis::Y, -FRAC_PI_2, c)?,
            rot(RotationAxis::Z, FRAC_PI_2, c)?,
            Gate::new(GateName::Iswap, &pair)?,
            rot(RotationAxis::Y, -FRAC_PI_2, t)?,
            rot(RotationAxis::Z, FRAC_PI_2, t)?,
        ]),
        TwoQubitBasis::SqrtSwap => Ok(vec![
            rot(RotationAxis::Y, FRAC_PI_2, t)?,
            Gate::new(GateName::SqrtSwap, &pair)?,
            rot(RotationAxis::Z, PI, c)?,
            Gate::new(GateName::SqrtSwap, &pair)?,
            rot(RotationAxis::Z, -FRAC_PI_2, t)?,
            rot(RotationAxis::Y, -FRAC_PI_2, t)?,
            rot(RotationAxis::Z, -FRAC_PI_2, c)?,
        ]),
        TwoQubitBasis::SqrtIswap => Ok(vec![
            rot(RotationAxis::Y, -FRAC_PI_2, c)?,
            rot(RotationAxis::X, FRAC_PI_2, c)?,
            rot(RotationAxis::X, -FRAC_PI_2, t)?,
            Gate::new(GateName::SqrtIswap, &pair)?,
            rot(RotationAxis::X, PI, c)?,
            Gate::new(GateName::SqrtIswap, &pair)?,
            rot(RotationAxis::Y, FRAC_PI_2, c)?,
            global_phase(FRAC_PI_4)?,
            rot(RotationAxis::Z, PI, c)?,
            global_phase(3.0 * FRAC_PI_2)?,
        ]),
    }
}

fn swap(a: usize, b: usize) -> CompileResult<Vec<Gate>> {
    Ok(vec![cnot(a, b)?, cnot(b, a)?, cnot(a, b)?])
}

fn iswap(a: usize, b: usize) -> CompileResult<Vec<Gate>> {
    Ok(vec![
        one(GateName::S, a)?,
        one(GateName::S, b)?,
        one(GateName::Snot, a)?,
        cnot(a, b)?,
        cnot(b, a)?,
        one(GateName::Snot, b)?,
    ])
}

fn toffoli(c0: usize, c1: usize, t: usize) -> CompileResult<Vec<Gate>> {
    let t_gate = |q| Gate::with_arg(GateName::PhaseGate, &[q], FRAC_PI_4);
    let tdg_gate = |q| Gate::with_arg(GateName::PhaseGate, &[q], -FRAC_PI_4);
    Ok(vec![
        one(GateName::Snot, t)?,
        cnot(c1, t)?,
        tdg_gate(t)?,
        cnot(c0, t)?,
        t_gate(t)?,
        cnot(c1, t)?,
        tdg_gate(t)?,
        cnot(c0, t)?,
        t_gate(c1)?,
        t_gate(t)?,
        one(GateName::Snot, t)?,
        cnot(c0, c1)?,
        t_gate(c0)?,
        tdg_gate(c1)?,
        cnot(c0, c1)?,
    ])
}

fn fredkin(c: usize, a: usize, b: usize) -> CompileResult<Vec<Gate>> {
    Ok(vec![
        cnot(b, a)?,
        Gate::controlled(GateName::Toffoli, &[c, a], &[b])?,
        cnot(b, a)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcirc_ir::ClassicalControl;

    fn names(circuit: &QubitCircuit) -> Vec<&str> {
        circuit.operations().iter().map(Operation::name).collect()
    }

    #[test]
    fn test_basis_gates_pass_through() {
        let mut qc = QubitCircuit::new(2);
        qc.cnot(0, 1).unwrap();
        qc.add_gate(Gate::with_arg("RZ", &[1], 0.3).unwrap()).unwrap();
        let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
        assert_eq!(resolved.operations(), qc.operations());
    }

    #[test]
    fn test_swap_becomes_three_cnots() {
        let mut qc = QubitCircuit::new(2);
        qc.swap(0, 1).unwrap();
        let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
        assert_eq!(names(&resolved), vec!["CNOT"; 3]);
        assert_eq!(resolved.operations()[1].qubits(), vec![1, 0]);
    }

    #[test]
    fn test_missing_axis_uses_quarter_turns() {
        let basis = Basis::new(TwoQubitBasis::Cnot, [RotationAxis::X, RotationAxis::Y]).unwrap();
        let mut qc = QubitCircuit::new(1);
        qc.add_gate(Gate::with_arg("RZ", &[0], 0.8).unwrap()).unwrap();
        let resolved = resolve_gates(&qc, &basis).unwrap();
        assert_eq!(names(&resolved), vec!["RX", "RY", "RX"]);
        assert!(
            resolved
                .compute_unitary()
                .unwrap()
                .distance(&qc.compute_unitary().unwrap())
                < 1e-12
        );
    }

    #[test]
    fn test_classical_controls_inherited() {
        let mut qc = QubitCircuit::with_cbits(2, 1);
        let control = ClassicalControl::new(vec![0]);
        qc.add_gate(
            Gate::new("SWAP", &[0, 1])
                .unwrap()
                .with_classical_controls(Some(control.clone())),
        )
        .unwrap();
        let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
        assert!(
            resolved
                .gates()
                .all(|g| g.classical_controls() == Some(&control))
        );
    }

    #[test]
    fn test_no_decomposition() {
        let mut qc = QubitCircuit::new(2);
        qc.add_gate(Gate::new("BERKELEY", &[0, 1]).unwrap()).unwrap();
        let err = resolve_gates(&qc, &Basis::default()).unwrap_err();
        assert_eq!(
            err,
            CompileError::NoDecomposition {
                gate: "BERKELEY".into(),
                basis: "CNOT+{RX,RY,RZ}".into(),
            }
        );
    }

    #[test]
    fn test_pass_requires_basis() {
        let mut qc = QubitCircuit::new(1);
        qc.snot(0).unwrap();
        let mut props = PropertySet::new();
        assert!(!ResolveGates.should_run(&qc, &props));
        assert_eq!(
            ResolveGates.run(&mut qc, &mut props).unwrap_err(),
            CompileError::MissingBasis
        );
        props.basis = Some(Basis::default());
        ResolveGates.run(&mut qc, &mut props).unwrap();
        assert_eq!(names(&qc), vec!["RZ", "RY", "RZ", "GLOBALPHASE"]);
    }
}
