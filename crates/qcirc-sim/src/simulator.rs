//! Circuit execution engine.

use std::collections::VecDeque;

use qcirc_ir::{Gate, Measurement, Operation, ProductOrder, QubitCircuit, gate_sequence_product};
use qcirc_linalg::Operator;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::{SimulatorConfig, SimulatorMode};
use crate::error::{SimError, SimResult};
use crate::result::CircuitResult;
use crate::state::QuantumState;

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorStatus {
    /// No state loaded.
    Idle,
    /// Initialized with operations left to apply.
    Running,
    /// Every operation has been applied.
    Halted,
}

/// Per-run inputs besides the initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Initial classical register; all bits start unwritten when `None`.
    pub cbits: Option<Vec<u8>>,
    /// Outcomes to force, one per measurement in circuit order. Measurements
    /// past the end of the list are sampled.
    pub measure_results: Vec<usize>,
}

impl RunOptions {
    /// No initial bits, no forced outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the given classical register.
    #[must_use]
    pub fn with_cbits(mut self, cbits: Vec<u8>) -> Self {
        self.cbits = Some(cbits);
        self
    }

    /// Force measurement outcomes in order.
    #[must_use]
    pub fn with_measure_results(mut self, results: Vec<usize>) -> Self {
        self.measure_results = results;
        self
    }
}

/// One unit of execution.
enum Step<'a> {
    /// Product of consecutive unconditioned gates.
    Block { op: Operator, gates: usize },
    /// A single gate; its matrix is cached when precomputing.
    Gate { gate: &'a Gate, op: Option<Operator> },
    /// A measurement with its full-register projectors.
    Measure {
        measurement: &'a Measurement,
        projectors: Vec<Operator>,
    },
}

/// A measurement branch awaiting further execution.
struct Branch {
    cursor: usize,
    state: QuantumState,
    probability: f64,
    cbits: Vec<Option<u8>>,
    measured: usize,
}

/// Evolves states through a borrowed circuit.
///
/// A simulator runs one trajectory at a time through [`run`](Self::run) (or
/// [`initialize`](Self::initialize) plus [`step`](Self::step)), sampling
/// measurement outcomes, or enumerates every outcome branch with
/// [`run_statistics`](Self::run_statistics).
///
/// With `precompute_unitary` the matrices are built once at construction and
/// runs of unconditioned gates are multiplied into a single step.
pub struct CircuitSimulator<'a> {
    circuit: &'a QubitCircuit,
    config: SimulatorConfig,
    steps: Vec<Step<'a>>,
    status: SimulatorStatus,
    state: Option<QuantumState>,
    cbits: Vec<Option<u8>>,
    cursor: usize,
    probability: f64,
    forced: VecDeque<usize>,
}

impl<'a> CircuitSimulator<'a> {
    /// Prepare a simulator for `circuit`.
    pub fn new(circuit: &'a QubitCircuit, config: SimulatorConfig) -> SimResult<Self> {
        config.validate()?;
        let steps = build_steps(circuit, config.precompute_unitary)?;
        debug!(
            "Prepared {} steps from {} operations",
            steps.len(),
            circuit.len()
        );
        Ok(Self {
            circuit,
            config,
            steps,
            status: SimulatorStatus::Idle,
            state: None,
            cbits: vec![None; circuit.num_cbits()],
            cursor: 0,
            probability: 1.0,
            forced: VecDeque::new(),
        })
    }

    /// The simulated circuit.
    pub fn circuit(&self) -> &'a QubitCircuit {
        self.circuit
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of execution steps.
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Lifecycle of the current run.
    pub fn status(&self) -> SimulatorStatus {
        self.status
    }

    /// The state of the current run.
    pub fn state(&self) -> Option<&QuantumState> {
        self.state.as_ref()
    }

    /// Classical register of the current run.
    pub fn cbits(&self) -> &[Option<u8>] {
        &self.cbits
    }

    /// Probability of the outcomes sampled so far.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    // =========================================================================
    // Single trajectory
    // =========================================================================

    /// Load an initial state and reset the run.
    pub fn initialize(
        &mut self,
        state: impl Into<QuantumState>,
        options: &RunOptions,
    ) -> SimResult<()> {
        let state = self.prepare_state(state.into())?;
        self.cbits = self.initial_cbits(options)?;
        self.state = Some(state);
        self.cursor = 0;
        self.probability = 1.0;
        self.forced = options.measure_results.iter().copied().collect();
        self.status = if self.steps.is_empty() {
            SimulatorStatus::Halted
        } else {
            SimulatorStatus::Running
        };
        Ok(())
    }

    /// Apply the next step, sampling with the thread-local generator.
    pub fn step(&mut self) -> SimResult<SimulatorStatus> {
        self.step_with_rng(&mut rand::thread_rng())
    }

    /// Apply the next step.
    pub fn step_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<SimulatorStatus> {
        match self.status {
            SimulatorStatus::Idle => return Err(SimError::NotInitialized),
            SimulatorStatus::Halted => return Ok(SimulatorStatus::Halted),
            SimulatorStatus::Running => {}
        }
        let mut state = self.state.take().ok_or(SimError::NotInitialized)?;
        let step = &self.steps[self.cursor];

        // the state goes back into the simulator even when the step fails
        let applied = match step {
            Step::Measure {
                measurement,
                projectors,
            } => (|| -> SimResult<()> {
                let probabilities = outcome_probabilities(&state, projectors)?;
                let tolerance = self.config.prune_tolerance;
                let outcome = match self.forced.pop_front() {
                    Some(k) => checked_outcome(measurement, &probabilities, k, tolerance)?,
                    None => sample(&probabilities, tolerance, rng).ok_or_else(|| {
                        SimError::ImpossibleOutcome {
                            measurement: measurement.name().to_string(),
                            outcome: 0,
                            probability: 0.0,
                        }
                    })?,
                };
                let p = probabilities[outcome];
                debug!("Measurement {} gave {outcome} (p = {p:.4})", measurement.name());
                let collapsed = state.collapse(&projectors[outcome], p)?;
                store_outcome(measurement, outcome, &mut self.cbits)?;
                state = collapsed;
                self.probability *= p;
                Ok(())
            })(),
            _ => apply_unitary_step(self.circuit, step, &mut state, &self.cbits),
        };
        self.state = Some(state);
        applied?;

        self.cursor += 1;
        if self.cursor == self.steps.len() {
            self.status = SimulatorStatus::Halted;
        }
        Ok(self.status)
    }

    /// Run one trajectory from `state`.
    pub fn run(&mut self, state: impl Into<QuantumState>) -> SimResult<CircuitResult> {
        self.run_with_rng(state, &mut rand::thread_rng())
    }

    /// Run one trajectory with a caller-supplied random generator.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &mut self,
        state: impl Into<QuantumState>,
        rng: &mut R,
    ) -> SimResult<CircuitResult> {
        self.run_with_options(state, &RunOptions::default(), rng)
    }

    /// Run one trajectory with initial bits and forced outcomes.
    #[instrument(skip(self, state, options, rng))]
    pub fn run_with_options<R: Rng + ?Sized>(
        &mut self,
        state: impl Into<QuantumState>,
        options: &RunOptions,
        rng: &mut R,
    ) -> SimResult<CircuitResult> {
        self.initialize(state, options)?;
        while self.status == SimulatorStatus::Running {
            self.step_with_rng(rng)?;
        }

        let mut result = CircuitResult::new();
        let state = self.state.clone().ok_or(SimError::NotInitialized)?;
        result.push(state, self.probability, self.cbits.clone());
        info!(
            "Run completed: {} steps, probability {:.4}",
            self.steps.len(),
            self.probability
        );
        Ok(result)
    }

    // =========================================================================
    // Branch enumeration
    // =========================================================================

    /// Enumerate every measurement branch from `state`.
    pub fn run_statistics(&self, state: impl Into<QuantumState>) -> SimResult<CircuitResult> {
        self.run_statistics_with_options(state, &RunOptions::default())
    }

    /// Enumerate every measurement branch, honouring initial bits and forced
    /// outcomes.
    ///
    /// Outcomes below the prune tolerance are dropped. Branches are listed in
    /// ascending outcome order of the measurements they passed.
    #[instrument(skip(self, state, options))]
    pub fn run_statistics_with_options(
        &self,
        state: impl Into<QuantumState>,
        options: &RunOptions,
    ) -> SimResult<CircuitResult> {
        let tolerance = self.config.prune_tolerance;
        let mut result = CircuitResult::new();
        let mut stack = vec![Branch {
            cursor: 0,
            state: self.prepare_state(state.into())?,
            probability: 1.0,
            cbits: self.initial_cbits(options)?,
            measured: 0,
        }];

        while let Some(mut branch) = stack.pop() {
            loop {
                let Some(step) = self.steps.get(branch.cursor) else {
                    debug!("Branch finished with probability {:.4}", branch.probability);
                    result.push(branch.state, branch.probability, branch.cbits);
                    break;
                };

                let Step::Measure {
                    measurement,
                    projectors,
                } = step
                else {
                    apply_unitary_step(self.circuit, step, &mut branch.state, &branch.cbits)?;
                    branch.cursor += 1;
                    continue;
                };

                let probabilities = outcome_probabilities(&branch.state, projectors)?;
                let outcomes: Vec<usize> = match options.measure_results.get(branch.measured) {
                    Some(&k) => vec![checked_outcome(measurement, &probabilities, k, tolerance)?],
                    None => (0..probabilities.len())
                        .filter(|&k| probabilities[k] > tolerance)
                        .collect(),
                };
                debug!(
                    "Measurement {} splits into {} branches",
                    measurement.name(),
                    outcomes.len()
                );

                for &k in outcomes.iter().rev() {
                    let p = probabilities[k];
                    let mut cbits = branch.cbits.clone();
                    store_outcome(measurement, k, &mut cbits)?;
                    stack.push(Branch {
                        cursor: branch.cursor + 1,
                        state: branch.state.collapse(&projectors[k], p)?,
                        probability: branch.probability * p,
                        cbits,
                        measured: branch.measured + 1,
                    });
                }
                break;
            }
        }

        info!("Statistics completed with {} branches", result.len());
        Ok(result)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn prepare_state(&self, state: QuantumState) -> SimResult<QuantumState> {
        if state.dims() != self.circuit.dims() {
            return Err(SimError::StateDimension {
                expected: self.circuit.dims().to_vec(),
                got: state.dims().to_vec(),
            });
        }
        Ok(match self.config.mode {
            SimulatorMode::StateVector => state,
            SimulatorMode::DensityMatrix => state.into_density(),
        })
    }

    fn initial_cbits(&self, options: &RunOptions) -> SimResult<Vec<Option<u8>>> {
        let expected = self.circuit.num_cbits();
        match &options.cbits {
            None => Ok(vec![None; expected]),
            Some(bits) if bits.len() == expected => Ok(bits.iter().copied().map(Some).collect()),
            Some(bits) => Err(SimError::ClbitCount {
                expected,
                got: bits.len(),
            }),
        }
    }
}

fn build_steps(circuit: &QubitCircuit, precompute: bool) -> SimResult<Vec<Step<'_>>> {
    let dims = circuit.dims();
    let registry = circuit.user_gates();
    let mut steps = vec![];
    let mut block: Vec<Operator> = vec![];

    for op in circuit.operations() {
        match op {
            Operation::Gate(gate) if precompute && gate.classical_controls().is_none() => {
                block.push(gate.operator(dims, registry)?);
            }
            Operation::Gate(gate) => {
                flush_block(&mut block, &mut steps)?;
                let op = if precompute {
                    Some(gate.operator(dims, registry)?)
                } else {
                    None
                };
                steps.push(Step::Gate { gate, op });
            }
            Operation::Measurement(measurement) => {
                flush_block(&mut block, &mut steps)?;
                steps.push(Step::Measure {
                    measurement,
                    projectors: measurement.projectors(dims)?,
                });
            }
        }
    }
    flush_block(&mut block, &mut steps)?;
    Ok(steps)
}

fn flush_block(block: &mut Vec<Operator>, steps: &mut Vec<Step<'_>>) -> SimResult<()> {
    if block.is_empty() {
        return Ok(());
    }
    let op = gate_sequence_product(block, ProductOrder::LeftToRight)?;
    steps.push(Step::Block {
        op,
        gates: block.len(),
    });
    block.clear();
    Ok(())
}

/// Apply a gate or gate block, honouring classical controls.
fn apply_unitary_step(
    circuit: &QubitCircuit,
    step: &Step<'_>,
    state: &mut QuantumState,
    cbits: &[Option<u8>],
) -> SimResult<()> {
    match step {
        Step::Block { op, gates } => {
            debug!("Applying block of {gates} gates");
            *state = state.evolve(op)?;
        }
        Step::Gate { gate, op } => {
            if let Some(control) = gate.classical_controls() {
                let fires = control
                    .evaluate(cbits)
                    .map_err(|clbit| SimError::UnwrittenClbit { clbit })?;
                if !fires {
                    debug!("Skipping {gate}: classical condition not met");
                    return Ok(());
                }
            }
            let owned;
            let u = match op {
                Some(u) => u,
                None => {
                    owned = gate.operator(circuit.dims(), circuit.user_gates())?;
                    &owned
                }
            };
            *state = state.evolve(u)?;
        }
        Step::Measure { .. } => {}
    }
    Ok(())
}

fn outcome_probabilities(state: &QuantumState, projectors: &[Operator]) -> SimResult<Vec<f64>> {
    projectors
        .iter()
        .map(|p| state.probability(p).map_err(SimError::from))
        .collect()
}

fn checked_outcome(
    measurement: &Measurement,
    probabilities: &[f64],
    outcome: usize,
    tolerance: f64,
) -> SimResult<usize> {
    let probability = probabilities.get(outcome).copied().unwrap_or(0.0);
    if probability <= tolerance {
        return Err(SimError::ImpossibleOutcome {
            measurement: measurement.name().to_string(),
            outcome,
            probability,
        });
    }
    Ok(outcome)
}

/// Draw an outcome among those above `tolerance`.
fn sample<R: Rng + ?Sized>(probabilities: &[f64], tolerance: f64, rng: &mut R) -> Option<usize> {
    let kept: Vec<usize> = (0..probabilities.len())
        .filter(|&k| probabilities[k] > tolerance)
        .collect();
    let total: f64 = kept.iter().map(|&k| probabilities[k]).sum();
    let r = rng.r#gen::<f64>() * total;

    let mut cumulative = 0.0;
    for &k in &kept {
        cumulative += probabilities[k];
        if r < cumulative {
            return Some(k);
        }
    }
    kept.last().copied()
}

/// Write the measured level into the classical store, if any.
///
/// Circuits only accept stores on qubits, so a level above 1 is an error
/// rather than something to truncate.
fn store_outcome(
    measurement: &Measurement,
    outcome: usize,
    cbits: &mut [Option<u8>],
) -> SimResult<()> {
    let Some(store) = measurement.classical_store() else {
        return Ok(());
    };
    let bit = u8::try_from(outcome)
        .ok()
        .filter(|&b| b <= 1)
        .ok_or_else(|| SimError::NonBinaryOutcome {
            measurement: measurement.name().to_string(),
            outcome,
        })?;
    cbits[store] = Some(bit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcirc_linalg::Ket;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn plus_state() -> QuantumState {
        let mut qc = QubitCircuit::new(1);
        qc.snot(0).unwrap();
        let u = qc.compute_unitary().unwrap();
        QuantumState::Ket(u.apply(&Ket::zero_state(&[2])).unwrap())
    }

    fn measure_one() -> QubitCircuit {
        let mut qc = QubitCircuit::with_cbits(1, 1);
        qc.measure(0, 0).unwrap();
        qc
    }

    #[test]
    fn test_sample_skips_pruned_outcomes() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(sample(&[0.0, 1.0, 1e-15], 1e-12, &mut rng), Some(1));
        }
        assert_eq!(sample(&[0.0, 0.0], 1e-12, &mut rng), None);
    }

    #[test]
    fn test_step_requires_initialize() {
        let qc = measure_one();
        let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        assert_eq!(sim.status(), SimulatorStatus::Idle);
        assert_eq!(sim.step().unwrap_err(), SimError::NotInitialized);
    }

    #[test]
    fn test_stepping() {
        let mut qc = QubitCircuit::with_cbits(1, 1);
        qc.snot(0).unwrap();
        qc.measure(0, 0).unwrap();
        let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        sim.initialize(Ket::zero_state(&[2]), &RunOptions::new().with_measure_results(vec![1]))
            .unwrap();
        assert_eq!(sim.status(), SimulatorStatus::Running);
        assert_eq!(sim.step().unwrap(), SimulatorStatus::Running);
        assert_eq!(sim.cbits(), &[None]);
        assert_eq!(sim.step().unwrap(), SimulatorStatus::Halted);
        assert_eq!(sim.cbits(), &[Some(1)]);
        assert!((sim.probability() - 0.5).abs() < 1e-12);
        assert_eq!(sim.step().unwrap(), SimulatorStatus::Halted);
    }

    #[test]
    fn test_precompute_merges_blocks() {
        let mut qc = QubitCircuit::with_cbits(2, 1);
        qc.snot(0).unwrap();
        qc.cnot(0, 1).unwrap();
        qc.measure(0, 0).unwrap();
        qc.x(1).unwrap();
        let eager = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        assert_eq!(eager.num_steps(), 4);
        let merged = CircuitSimulator::new(
            &qc,
            SimulatorConfig::default().with_precompute_unitary(true),
        )
        .unwrap();
        assert_eq!(merged.num_steps(), 3);
    }

    #[test]
    fn test_forced_impossible_outcome() {
        let qc = measure_one();
        let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        let err = sim
            .run_with_options(
                Ket::zero_state(&[2]),
                &RunOptions::new().with_measure_results(vec![1]),
                &mut SmallRng::seed_from_u64(1),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::ImpossibleOutcome { outcome: 1, .. }
        ));
    }

    #[test]
    fn test_statistics_of_plus_state() {
        let qc = measure_one();
        let sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        let result = sim.run_statistics(plus_state()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.cbits(0), Some(&[Some(0)][..]));
        assert_eq!(result.cbits(1), Some(&[Some(1)][..]));
        let total: f64 = result.probabilities().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_state_dimension_checked() {
        let qc = measure_one();
        let sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        assert_eq!(
            sim.run_statistics(Ket::zero_state(&[2, 2])).unwrap_err(),
            SimError::StateDimension {
                expected: vec![2],
                got: vec![2, 2]
            }
        );
    }

    #[test]
    fn test_failed_step_keeps_state() {
        let qc = measure_one();
        let mut sim = CircuitSimulator::new(&qc, SimulatorConfig::default()).unwrap();
        sim.initialize(Ket::zero_state(&[2]), &RunOptions::new().with_measure_results(vec![1]))
            .unwrap();
        assert!(matches!(
            sim.step().unwrap_err(),
            SimError::ImpossibleOutcome { outcome: 1, .. }
        ));
        assert_eq!(sim.status(), SimulatorStatus::Running);
        assert!(sim.state().is_some());
        assert_eq!(sim.cbits(), &[None]);
    }

    #[test]
    fn test_store_outcome_rejects_levels_above_one() {
        let m = Measurement::new("M0", &[0], Some(1)).unwrap();
        let mut cbits = vec![None, None];
        store_outcome(&m, 1, &mut cbits).unwrap();
        assert_eq!(cbits, vec![None, Some(1)]);
        for level in [2, 256] {
            assert_eq!(
                store_outcome(&m, level, &mut cbits).unwrap_err(),
                SimError::NonBinaryOutcome {
                    measurement: "M0".into(),
                    outcome: level
                }
            );
        }
        assert_eq!(cbits, vec![None, Some(1)]);

        let unstored = Measurement::new("M0", &[0], None).unwrap();
        store_outcome(&unstored, 2, &mut cbits).unwrap();
    }
}
