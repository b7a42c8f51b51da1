//! Gate resolution and adjacency tests.

use std::f64::consts::PI;

use qcirc_compile::{
    Basis, CompileError, RotationAxis, TwoQubitBasis, Unitary2x2, adjacent_gates, resolve_gates,
};
use qcirc_ir::{Gate, GateName, Operation, QubitCircuit, matrices};

const TOL: f64 = 1e-12;

const ENTANGLERS: [TwoQubitBasis; 5] = [
    TwoQubitBasis::Cnot,
    TwoQubitBasis::Csign,
    TwoQubitBasis::Iswap,
    TwoQubitBasis::SqrtSwap,
    TwoQubitBasis::SqrtIswap,
];

fn all_bases() -> Vec<Basis> {
    use RotationAxis::{X, Y, Z};
    let axis_sets: [&[RotationAxis]; 4] = [&[X, Y, Z], &[X, Y], &[Y, Z], &[X, Z]];
    ENTANGLERS
        .iter()
        .flat_map(|&e| {
            axis_sets
                .iter()
                .map(move |axes| Basis::new(e, axes.iter().copied()).unwrap())
        })
        .collect()
}

/// One instance of every standard gate, placed on a three-qubit register.
fn source_gates() -> Vec<Gate> {
    let one = |name: &str| Gate::new(name, &[1]).unwrap();
    let rot = |name: &str| Gate::with_arg(name, &[2], 0.37).unwrap();
    let ctl = |name: &str| Gate::controlled(name, &[2], &[0]).unwrap();
    let crot = |name: &str| {
        Gate::builder(name)
            .control(0)
            .target(2)
            .arg(-1.21)
            .build()
            .unwrap()
    };
    let pair = |name: &str| Gate::new(name, &[2, 0]).unwrap();

    vec![
        one("X"),
        one("Y"),
        one("Z"),
        one("S"),
        one("T"),
        one("SNOT"),
        one("SQRTNOT"),
        rot("RX"),
        rot("RY"),
        rot("RZ"),
        rot("PHASEGATE"),
        Gate::builder("QASMU")
            .target(0)
            .arg_value(vec![0.3, -0.8, 2.1])
            .build()
            .unwrap(),
        ctl("CNOT"),
        ctl("CSIGN"),
        ctl("CY"),
        ctl("CZ"),
        ctl("CS"),
        ctl("CT"),
        crot("CRX"),
        crot("CRY"),
        crot("CRZ"),
        crot("CPHASE"),
        pair("SWAP"),
        pair("ISWAP"),
        pair("SQRTSWAP"),
        pair("SQRTISWAP"),
        pair("BERKELEY"),
        Gate::with_arg("SWAPALPHA", &[0, 1], 0.6).unwrap(),
        Gate::controlled("TOFFOLI", &[2, 0], &[1]).unwrap(),
        Gate::controlled("FREDKIN", &[1], &[2, 0]).unwrap(),
        Gate::builder("GLOBALPHASE").arg(0.9).build().unwrap(),
    ]
}

fn expect_resolvable(gate: &GateName, basis: &Basis) -> bool {
    match gate {
        GateName::Berkeley | GateName::SwapAlpha => false,
        GateName::SqrtSwap => basis.two_qubit() == TwoQubitBasis::SqrtSwap,
        GateName::SqrtIswap => basis.two_qubit() == TwoQubitBasis::SqrtIswap,
        _ => true,
    }
}

fn single(gate: Gate) -> QubitCircuit {
    let mut qc = QubitCircuit::new(3);
    qc.add_gate(gate).unwrap();
    qc
}

// =============================================================================
// Every gate into every basis
// =============================================================================

#[test]
fn test_every_gate_every_basis() {
    for basis in all_bases() {
        for gate in source_gates() {
            let qc = single(gate.clone());
            match resolve_gates(&qc, &basis) {
                Ok(resolved) => {
                    assert!(
                        expect_resolvable(gate.name(), &basis),
                        "{gate} unexpectedly resolved into {basis}"
                    );
                    assert!(
                        resolved.gates().all(|g| basis.contains(g.name())),
                        "{gate} left gates outside {basis}"
                    );
                    let distance = resolved
                        .compute_unitary()
                        .unwrap()
                        .distance(&qc.compute_unitary().unwrap());
                    assert!(distance < TOL, "{gate} into {basis}: distance {distance:e}");
                }
                Err(CompileError::NoDecomposition { gate: name, .. }) => {
                    assert!(
                        !expect_resolvable(gate.name(), &basis),
                        "{gate} failed to resolve into {basis} at {name}"
                    );
                }
                Err(other) => panic!("{gate} into {basis}: {other}"),
            }
        }
    }
}

#[test]
fn test_mixed_circuit_default_basis() {
    let mut qc = QubitCircuit::new(3);
    for gate in source_gates()
        .into_iter()
        .filter(|g| expect_resolvable(g.name(), &Basis::default()))
        .filter(|g| !matches!(g.name(), GateName::SqrtSwap | GateName::SqrtIswap))
    {
        qc.add_gate(gate).unwrap();
    }
    let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
    let distance = resolved
        .compute_unitary()
        .unwrap()
        .distance(&qc.compute_unitary().unwrap());
    assert!(distance < TOL, "distance {distance:e}");
}

// =============================================================================
// Structure of specific decompositions
// =============================================================================

fn count(circuit: &QubitCircuit, name: &str) -> usize {
    circuit.operations().iter().filter(|op| op.name() == name).count()
}

#[test]
fn test_snot_resolution() {
    let mut qc = QubitCircuit::new(1);
    qc.snot(0).unwrap();
    let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
    let names: Vec<&str> = resolved.operations().iter().map(Operation::name).collect();
    assert_eq!(names, vec!["RZ", "RY", "RZ", "GLOBALPHASE"]);
    let gamma = resolved.operations()[1].as_gate().unwrap().scalar_arg().unwrap();
    assert!((gamma - PI / 2.0).abs() < TOL);
}

#[test]
fn test_toffoli_resolution() {
    let qc = single(Gate::controlled("TOFFOLI", &[0, 1], &[2]).unwrap());
    let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
    assert_eq!(count(&resolved, "CNOT"), 6);
    assert!(
        resolved
            .compute_unitary()
            .unwrap()
            .distance(&matrices::toffoli().unwrap())
            < TOL
    );
}

#[test]
fn test_fredkin_resolution() {
    let qc = single(Gate::controlled("FREDKIN", &[0], &[1, 2]).unwrap());
    let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
    assert_eq!(count(&resolved, "CNOT"), 8);
    assert!(
        resolved
            .compute_unitary()
            .unwrap()
            .distance(&matrices::fredkin().unwrap())
            < TOL
    );
}

#[test]
fn test_cnot_into_entanglers() {
    let expected = [
        (TwoQubitBasis::Cnot, "CNOT", 1),
        (TwoQubitBasis::Csign, "CSIGN", 1),
        (TwoQubitBasis::Iswap, "ISWAP", 2),
        (TwoQubitBasis::SqrtSwap, "SQRTSWAP", 2),
        (TwoQubitBasis::SqrtIswap, "SQRTISWAP", 2),
    ];
    for (entangler, name, n) in expected {
        let basis = Basis::new(entangler, [RotationAxis::X, RotationAxis::Y, RotationAxis::Z])
            .unwrap();
        let mut qc = QubitCircuit::new(2);
        qc.cnot(1, 0).unwrap();
        let resolved = resolve_gates(&qc, &basis).unwrap();
        assert_eq!(count(&resolved, name), n, "entangler {name}");
    }
}

#[test]
fn test_user_gate_resolution() {
    let mut qc = QubitCircuit::new(2);
    qc.add_user_gate("SQRTY", |_| {
        let h = matrices::snot().unwrap();
        let s = matrices::s().unwrap();
        s.matmul(&h).unwrap()
    });
    qc.add_gate(Gate::new("SQRTY", &[1]).unwrap()).unwrap();
    let resolved = resolve_gates(&qc, &Basis::default()).unwrap();
    assert!(resolved.gates().all(|g| !g.name().is_user()));
    assert!(
        resolved
            .compute_unitary()
            .unwrap()
            .distance(&qc.compute_unitary().unwrap())
            < TOL
    );

    qc.add_user_gate("PAIR", |_| matrices::iswap().unwrap());
    qc.add_gate(Gate::new("PAIR", &[0, 1]).unwrap()).unwrap();
    assert!(matches!(
        resolve_gates(&qc, &Basis::default()),
        Err(CompileError::NoDecomposition { gate, .. }) if gate == "PAIR"
    ));
}

// =============================================================================
// ZYZ reassembly
// =============================================================================

fn zyz_gates(op: &qcirc_linalg::Operator) -> Vec<Gate> {
    let angles = Unitary2x2::from_operator(op).unwrap().zyz();
    vec![
        Gate::with_arg("RZ", &[0], angles.delta).unwrap(),
        Gate::with_arg("RY", &[0], angles.gamma).unwrap(),
        Gate::with_arg("RZ", &[0], angles.beta).unwrap(),
        Gate::builder("GLOBALPHASE").arg(angles.alpha).build().unwrap(),
    ]
}

#[test]
fn test_zyz_gates_rebuild_hadamard_and_x() {
    for op in [matrices::snot().unwrap(), matrices::x().unwrap()] {
        let mut qc = QubitCircuit::new(1);
        qc.add_gates(zyz_gates(&op)).unwrap();
        assert!(qc.compute_unitary().unwrap().distance(&op) < TOL);
    }
}

// =============================================================================
// Adjacency
// =============================================================================

#[test]
fn test_adjacent_iswap_then_resolve() {
    let mut qc = QubitCircuit::new(3);
    qc.add_gate(Gate::new("ISWAP", &[0, 2]).unwrap()).unwrap();

    let adjacent = adjacent_gates(&qc).unwrap();
    assert!(adjacent.gates().all(|g| {
        let mut q = g.qubits();
        q.sort_unstable();
        q.windows(2).all(|w| w[1] == w[0] + 1)
    }));

    let basis = Basis::new(TwoQubitBasis::Iswap, [RotationAxis::X, RotationAxis::Z]).unwrap();
    let resolved = resolve_gates(&adjacent, &basis).unwrap();
    let original = qc.compute_unitary().unwrap();
    assert!(adjacent.compute_unitary().unwrap().distance(&original) < TOL);
    assert!(resolved.compute_unitary().unwrap().distance(&original) < TOL);
}

#[test]
fn test_adjacent_three_qubit_gate() {
    let mut qc = QubitCircuit::new(5);
    qc.add_gate(Gate::controlled("TOFFOLI", &[4, 0], &[2]).unwrap())
        .unwrap();
    qc.add_gate(Gate::controlled("FREDKIN", &[3], &[0, 4]).unwrap())
        .unwrap();
    let adjacent = adjacent_gates(&qc).unwrap();
    assert!(count(&adjacent, "SWAP") > 0);
    assert!(
        adjacent
            .compute_unitary()
            .unwrap()
            .distance(&qc.compute_unitary().unwrap())
            < TOL
    );
}

#[test]
fn test_adjacent_keeps_measurements() {
    let mut qc = QubitCircuit::with_cbits(3, 1);
    qc.cnot(0, 2).unwrap();
    qc.measure(2, 0).unwrap();
    let adjacent = adjacent_gates(&qc).unwrap();
    assert_eq!(adjacent.measurements().count(), 1);
    assert_eq!(adjacent.operations().last().unwrap().name(), "M2");
}
