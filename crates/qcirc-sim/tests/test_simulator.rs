//! Integration tests for circuit simulation.

use num_complex::Complex64;
use qcirc_ir::{Gate, GateArg, IrError, QubitCircuit};
use qcirc_linalg::random::{rand_ket, rand_unitary_haar};
use qcirc_linalg::{Ket, Operator};
use qcirc_sim::{
    CircuitExt, CircuitSimulator, QuantumState, RunOptions, SimError, SimulatorConfig,
    SimulatorMode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Teleport qubit 0 onto qubit 2 with mid-circuit measurements and
/// classically controlled corrections.
fn teleportation() -> QubitCircuit {
    let mut qc = QubitCircuit::with_cbits(3, 2);
    qc.snot(1).unwrap();
    qc.cnot(1, 2).unwrap();
    qc.cnot(0, 1).unwrap();
    qc.snot(0).unwrap();
    qc.measure(0, 0).unwrap();
    qc.measure(1, 1).unwrap();
    qc.add_gate(
        Gate::builder("X")
            .target(2)
            .classical_controls([1])
            .build()
            .unwrap(),
    )
    .unwrap();
    qc.add_gate(
        Gate::builder("Z")
            .target(2)
            .classical_controls([0])
            .build()
            .unwrap(),
    )
    .unwrap();
    qc
}

fn teleportation_input(rng: &mut SmallRng) -> (Ket, Ket) {
    let input = rand_ket(&[2], rng);
    let full = input.tensor(&Ket::zero_state(&[2, 2]));
    (input, full)
}

fn bell_state() -> Ket {
    let amp = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    Ket::from_vec(vec![2, 2], vec![amp, zero, zero, amp]).unwrap()
}

fn measure_all(n: usize) -> QubitCircuit {
    let mut qc = QubitCircuit::with_cbits(n, n);
    for q in 0..n {
        qc.measure(q, q).unwrap();
    }
    qc
}

fn reduced(state: &QuantumState, keep: &[usize]) -> Operator {
    state.to_density().ptrace(keep).unwrap()
}

fn all_configs() -> Vec<SimulatorConfig> {
    let mut configs = vec![];
    for mode in [SimulatorMode::StateVector, SimulatorMode::DensityMatrix] {
        for precompute in [false, true] {
            configs.push(
                SimulatorConfig::new()
                    .with_mode(mode)
                    .with_precompute_unitary(precompute),
            );
        }
    }
    configs
}

// =============================================================================
// Teleportation
// =============================================================================

#[test]
fn test_teleportation_single_run() {
    let qc = teleportation();
    let mut rng = SmallRng::seed_from_u64(11);

    for config in all_configs() {
        let mut sim = CircuitSimulator::new(&qc, config).unwrap();
        for _ in 0..8 {
            let (input, full) = teleportation_input(&mut rng);
            let result = sim.run_with_rng(full, &mut rng).unwrap();
            assert_eq!(result.len(), 1);

            let cbits = result.cbits(0).unwrap();
            assert!(cbits.iter().all(Option::is_some));
            assert!((result.probability(0).unwrap() - 0.25).abs() < 1e-10);

            let out = reduced(result.final_state(0).unwrap(), &[2]);
            assert!(out.approx_eq(&input.to_density(), 1e-10));
        }
    }
}

#[test]
fn test_teleportation_statistics() {
    let qc = teleportation();
    let mut rng = SmallRng::seed_from_u64(5);
    let (input, full) = teleportation_input(&mut rng);

    for config in all_configs() {
        let sim = CircuitSimulator::new(&qc, config).unwrap();
        let result = sim.run_statistics(full.clone()).unwrap();
        assert_eq!(result.len(), 4);

        let expected_bits = [[0, 0], [0, 1], [1, 0], [1, 1]];
        for (i, bits) in expected_bits.iter().enumerate() {
            assert!((result.probability(i).unwrap() - 0.25).abs() < 1e-10);
            let cbits: Vec<u8> = result.cbits(i).unwrap().iter().flatten().copied().collect();
            assert_eq!(&cbits, bits);
            let out = reduced(result.final_state(i).unwrap(), &[2]);
            assert!(out.approx_eq(&input.to_density(), 1e-10));
        }
    }
}

#[test]
fn test_density_matrix_matches_mixed_statistics() {
    let qc = teleportation();
    let mut rng = SmallRng::seed_from_u64(23);
    let (_, full) = teleportation_input(&mut rng);

    let pure = qc.run_statistics(full.clone()).unwrap();
    let mixed = qc.run_statistics(full.to_density()).unwrap();
    assert_eq!(pure.len(), mixed.len());
    assert!(
        pure.mixed_state()
            .unwrap()
            .approx_eq(&mixed.mixed_state().unwrap(), 1e-10)
    );
    assert!(mixed.final_states().iter().all(|s| s.as_density().is_some()));
}

#[test]
fn test_circuit_ext_run_follows_state_kind() {
    let mut qc = QubitCircuit::new(2);
    qc.snot(0).unwrap();
    qc.cnot(0, 1).unwrap();

    let ket = qc.run(Ket::zero_state(&[2, 2])).unwrap();
    let fidelity = ket.as_ket().unwrap().fidelity(&bell_state()).unwrap();
    assert!((fidelity - 1.0).abs() < 1e-12);

    let rho = qc.run(Ket::zero_state(&[2, 2]).to_density()).unwrap();
    assert!(
        rho.as_density()
            .unwrap()
            .approx_eq(&bell_state().to_density(), 1e-12)
    );
}

// =============================================================================
// Measurement circuits
// =============================================================================

#[test]
fn test_bell_measurements_are_correlated() {
    let qc = measure_all(2);
    let mut rng = SmallRng::seed_from_u64(42);

    for precompute in [false, true] {
        let config = SimulatorConfig::new().with_precompute_unitary(precompute);
        let mut sim = CircuitSimulator::new(&qc, config).unwrap();
        let mut seen = [false; 2];
        for _ in 0..64 {
            let result = sim.run_with_rng(bell_state(), &mut rng).unwrap();
            let cbits = result.cbits(0).unwrap();
            assert_eq!(cbits[0], cbits[1]);
            seen[usize::from(cbits[0].unwrap())] = true;
        }
        assert_eq!(seen, [true, true]);
    }
}

#[test]
fn test_w_state_statistics() {
    let amp = Complex64::new(1.0 / 3f64.sqrt(), 0.0);
    let zero = Complex64::new(0.0, 0.0);
    let mut amplitudes = vec![zero; 8];
    for index in [1, 2, 4] {
        amplitudes[index] = amp;
    }
    let w = Ket::from_vec(vec![2, 2, 2], amplitudes).unwrap();

    let result = measure_all(3).run_statistics(w).unwrap();
    assert_eq!(result.len(), 3);
    for i in 0..3 {
        assert!((result.probability(i).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        let ones = result
            .cbits(i)
            .unwrap()
            .iter()
            .filter(|b| **b == Some(1))
            .count();
        assert_eq!(ones, 1);
    }
    let total: f64 = result.probabilities().iter().sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn test_n_level_register() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mat3 = rand_unitary_haar(&[3], &mut rng);
    let gate_mat3 = mat3.clone();

    let mut qc = QubitCircuit::with_dims(vec![3, 2], 1).unwrap();
    qc.add_user_gate("CTRLMAT3", move |_: Option<&GateArg>| {
        let on = Operator::fock_dm(2, 1).unwrap().tensor(&gate_mat3);
        let off = Operator::fock_dm(2, 0)
            .unwrap()
            .tensor(&Operator::identity(&[3]));
        &on + &off
    });
    qc.add_gate(Gate::builder("CTRLMAT3").targets([1, 0]).build().unwrap())
        .unwrap();
    qc.measure(1, 0).unwrap();

    let init = Ket::basis(&[3, 2], &[0, 1]).unwrap();
    let result = qc.run_statistics(init).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.cbits(0), Some(&[Some(1)][..]));

    let expected = mat3
        .apply(&Ket::basis(&[3], &[0]).unwrap())
        .unwrap()
        .tensor(&Ket::basis(&[2], &[1]).unwrap());
    let out = result.final_state(0).unwrap().as_ket().unwrap();
    assert!((out.fidelity(&expected).unwrap() - 1.0).abs() < 1e-10);
}

// =============================================================================
// Classical bits and forced outcomes
// =============================================================================

fn conditional_flip() -> QubitCircuit {
    let mut qc = QubitCircuit::with_cbits(1, 1);
    qc.add_gate(
        Gate::builder("X")
            .target(0)
            .classical_controls([0])
            .build()
            .unwrap(),
    )
    .unwrap();
    qc
}

#[test]
fn test_unwritten_clbit() {
    let qc = conditional_flip();
    let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    assert_eq!(
        sim.run(Ket::zero_state(&[2])).unwrap_err(),
        SimError::UnwrittenClbit { clbit: 0 }
    );
}

#[test]
fn test_supplied_cbits_drive_controls() {
    let qc = conditional_flip();
    let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    let mut rng = SmallRng::seed_from_u64(0);

    let one = Ket::basis(&[2], &[1]).unwrap();
    let fired = sim
        .run_with_options(
            Ket::zero_state(&[2]),
            &RunOptions::new().with_cbits(vec![1]),
            &mut rng,
        )
        .unwrap();
    let state = fired.final_state(0).unwrap().as_ket().unwrap();
    assert!((state.fidelity(&one).unwrap() - 1.0).abs() < 1e-12);

    let skipped = sim
        .run_with_options(
            Ket::zero_state(&[2]),
            &RunOptions::new().with_cbits(vec![0]),
            &mut rng,
        )
        .unwrap();
    let state = skipped.final_state(0).unwrap().as_ket().unwrap();
    assert!((state.fidelity(&Ket::zero_state(&[2])).unwrap() - 1.0).abs() < 1e-12);

    assert_eq!(
        sim.run_with_options(
            Ket::zero_state(&[2]),
            &RunOptions::new().with_cbits(vec![0, 1]),
            &mut rng,
        )
        .unwrap_err(),
        SimError::ClbitCount {
            expected: 1,
            got: 2
        }
    );
}

#[test]
fn test_forced_outcomes_select_branch() {
    let qc = teleportation();
    let mut rng = SmallRng::seed_from_u64(31);
    let (input, full) = teleportation_input(&mut rng);
    let options = RunOptions::new().with_measure_results(vec![1, 0]);

    let sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    let result = sim.run_statistics_with_options(full.clone(), &options).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.cbits(0), Some(&[Some(1), Some(0)][..]));
    assert!((result.probability(0).unwrap() - 0.25).abs() < 1e-10);

    let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    let single = sim.run_with_options(full, &options, &mut rng).unwrap();
    assert_eq!(single.cbits(0), Some(&[Some(1), Some(0)][..]));
    let out = reduced(single.final_state(0).unwrap(), &[2]);
    assert!(out.approx_eq(&input.to_density(), 1e-10));
}

#[test]
fn test_forced_outcome_only_constrains_listed_measurements() {
    let qc = measure_all(2);
    let sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    let plus_plus = Ket::from_vec(vec![2, 2], vec![Complex64::new(0.5, 0.0); 4]).unwrap();
    let result = sim
        .run_statistics_with_options(plus_plus, &RunOptions::new().with_measure_results(vec![0]))
        .unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.cbits(0), Some(&[Some(0), Some(0)][..]));
    assert_eq!(result.cbits(1), Some(&[Some(0), Some(1)][..]));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_state_dimension_mismatch() {
    let qc = teleportation();
    let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    assert!(matches!(
        sim.run(Ket::zero_state(&[2, 2])),
        Err(SimError::StateDimension { .. })
    ));
}

#[test]
fn test_unknown_user_gate() {
    let mut qc = QubitCircuit::new(1);
    qc.add_gate(Gate::new("MYSTERY", &[0]).unwrap()).unwrap();

    let precomputed = CircuitSimulator::new(
        &qc,
        SimulatorConfig::default().with_precompute_unitary(true),
    );
    assert!(matches!(
        precomputed,
        Err(SimError::Ir(IrError::UnknownGate(_)))
    ));

    let mut lazy = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
    assert!(matches!(
        lazy.run(Ket::zero_state(&[2])),
        Err(SimError::Ir(IrError::UnknownGate(_)))
    ));
}

#[test]
fn test_config_from_yaml_drives_mode() {
    let config = SimulatorConfig::from_yaml_str(
        "mode: density_matrix_simulator\nprecompute_unitary: true\n",
    )
    .unwrap();
    let qc = measure_all(1);
    let mut sim = CircuitSimulator::new(&qc, config).unwrap();
    let result = sim.run(Ket::zero_state(&[2])).unwrap();
    assert!(result.final_state(0).unwrap().as_density().is_some());
}
