//! The circuit container.

use qcirc_linalg::Operator;
use serde::Serialize;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateArg, GateName};
use crate::measurement::Measurement;
use crate::operation::Operation;
use crate::propagator::{ProductOrder, gate_sequence_product};
use crate::registry::UserGateRegistry;

/// Which label list [`QubitCircuit::add_state`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// Labels shown before the first operation.
    Input,
    /// Labels shown after the last operation.
    Output,
}

/// Which matches [`QubitCircuit::remove_by_name`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMode {
    /// The first matching operation.
    #[default]
    First,
    /// The last matching operation.
    Last,
    /// Every matching operation.
    All,
}

/// An ordered list of gates and measurements on a register of qudits.
///
/// Qubit indices run over `0..num_qubits`, each with a subsystem dimension
/// (2 unless set otherwise). Classical bits run over `0..num_cbits`.
/// Every operation is range-checked when it is placed.
#[derive(Debug, Clone, Serialize)]
pub struct QubitCircuit {
    num_qubits: usize,
    dims: Vec<usize>,
    num_cbits: usize,
    operations: Vec<Operation>,
    #[serde(skip)]
    user_gates: UserGateRegistry,
    input_states: Vec<Option<String>>,
    output_states: Vec<Option<String>>,
    reverse_states: bool,
}

impl QubitCircuit {
    /// A circuit on `num_qubits` qubits without classical bits.
    pub fn new(num_qubits: usize) -> Self {
        Self::with_cbits(num_qubits, 0)
    }

    /// A circuit on `num_qubits` qubits and `num_cbits` classical bits.
    pub fn with_cbits(num_qubits: usize, num_cbits: usize) -> Self {
        Self {
            num_qubits,
            dims: vec![2; num_qubits],
            num_cbits,
            operations: vec![],
            user_gates: UserGateRegistry::default(),
            input_states: vec![None; num_qubits + num_cbits],
            output_states: vec![None; num_qubits + num_cbits],
            reverse_states: true,
        }
    }

    /// A circuit on qudits with the given subsystem dimensions.
    pub fn with_dims(dims: Vec<usize>, num_cbits: usize) -> IrResult<Self> {
        if dims.iter().any(|&d| d < 2) {
            return Err(IrError::InvalidDimensions(dims));
        }
        let mut circuit = Self::with_cbits(dims.len(), num_cbits);
        circuit.dims = dims;
        Ok(circuit)
    }

    /// Set the display ordering flag.
    #[must_use]
    pub fn with_reverse_states(mut self, reverse: bool) -> Self {
        self.reverse_states = reverse;
        self
    }

    /// Register a user gate on this circuit.
    pub fn add_user_gate<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Option<&GateArg>) -> Operator + Send + Sync + 'static,
    {
        self.user_gates.insert(name, f);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of qudits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Subsystem dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of classical bits.
    pub fn num_cbits(&self) -> usize {
        self.num_cbits
    }

    /// Operations in order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Gates in order, skipping measurements.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.operations.iter().filter_map(Operation::as_gate)
    }

    /// Measurements in order.
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.operations.iter().filter_map(Operation::as_measurement)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The user-gate registry.
    pub fn user_gates(&self) -> &UserGateRegistry {
        &self.user_gates
    }

    /// Mutable access to the user-gate registry.
    pub fn user_gates_mut(&mut self) -> &mut UserGateRegistry {
        &mut self.user_gates
    }

    /// Input labels, one per qubit followed by one per classical bit.
    pub fn input_states(&self) -> &[Option<String>] {
        &self.input_states
    }

    /// Output labels, one per qubit followed by one per classical bit.
    pub fn output_states(&self) -> &[Option<String>] {
        &self.output_states
    }

    /// Display ordering flag.
    pub fn reverse_states(&self) -> bool {
        self.reverse_states
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn check_operation(&self, op: &Operation) -> IrResult<()> {
        if let Some(&qubit) = op.qubits().iter().find(|&&q| q >= self.num_qubits) {
            return Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        if let Some(&clbit) = op.clbits().iter().find(|&&c| c >= self.num_cbits) {
            return Err(IrError::ClbitOutOfRange {
                clbit,
                num_cbits: self.num_cbits,
            });
        }
        if let Operation::Measurement(m) = op {
            if let (Some(_), [target]) = (m.classical_store(), m.targets()) {
                if self.dims[*target] != 2 {
                    return Err(IrError::InvalidMeasurement {
                        name: m.name().to_string(),
                        reason: format!(
                            "a classical store needs a qubit, subsystem {target} has dimension {}",
                            self.dims[*target]
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Append an operation.
    pub fn add_operation(&mut self, op: impl Into<Operation>) -> IrResult<&mut Self> {
        let op = op.into();
        self.check_operation(&op)?;
        self.operations.push(op);
        Ok(self)
    }

    /// Append a gate.
    pub fn add_gate(&mut self, gate: Gate) -> IrResult<&mut Self> {
        self.add_operation(gate)
    }

    /// Append a measurement.
    pub fn add_measurement(&mut self, measurement: Measurement) -> IrResult<&mut Self> {
        self.add_operation(measurement)
    }

    /// Insert a copy of `gate` before each listed position of the current
    /// operation list.
    ///
    /// Positions refer to the list as it was before the call, so the order in
    /// which they are given does not matter; `len()` appends.
    pub fn add_gate_at(&mut self, gate: Gate, indices: &[usize]) -> IrResult<&mut Self> {
        let op = Operation::Gate(gate);
        self.check_operation(&op)?;

        let len = self.operations.len();
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        if let Some(&index) = sorted.iter().find(|&&i| i > len) {
            return Err(IrError::IndexOutOfRange { index, len });
        }
        for (shift, index) in sorted.into_iter().enumerate() {
            self.operations.insert(index + shift, op.clone());
        }
        Ok(self)
    }

    /// Add a one-qubit gate on every qubit from `start` to `end` inclusive
    /// (the last qubit when `end` is `None`).
    pub fn add_1q_gate(
        &mut self,
        name: impl Into<GateName>,
        start: usize,
        end: Option<usize>,
        arg: Option<f64>,
    ) -> IrResult<&mut Self> {
        let name = name.into();
        if !name.is_single_qubit() {
            return Err(IrError::invalid_gate(
                name.as_str(),
                "is not a single-qubit gate",
            ));
        }
        let end = end.unwrap_or(self.num_qubits.saturating_sub(1));
        let gates = (start..=end)
            .map(|q| {
                let builder = Gate::builder(name.clone()).target(q);
                match arg {
                    Some(value) => builder.arg(value).build(),
                    None => builder.build(),
                }
            })
            .collect::<IrResult<Vec<_>>>()?;
        self.add_gates(gates)
    }

    /// Append a sequence of gates; nothing is added if any gate is rejected.
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> IrResult<&mut Self> {
        let ops: Vec<Operation> = gates.into_iter().map(Operation::Gate).collect();
        for op in &ops {
            self.check_operation(op)?;
        }
        self.operations.extend(ops);
        Ok(self)
    }

    /// Append every operation of `other`, placing its qubit 0 on qubit `start`.
    ///
    /// Classical bit indices are kept. The user gates of `other` are merged
    /// into this circuit's registry.
    pub fn add_circuit(&mut self, other: &QubitCircuit, start: usize) -> IrResult<&mut Self> {
        if start + other.num_qubits > self.num_qubits {
            return Err(IrError::RegisterOverflow {
                start,
                width: other.num_qubits,
                num_qubits: self.num_qubits,
            });
        }
        if self.dims[start..start + other.num_qubits] != other.dims[..] {
            return Err(IrError::InvalidDimensions(other.dims.clone()));
        }

        let ops: Vec<Operation> = other.operations.iter().map(|op| op.shifted(start)).collect();
        for op in &ops {
            self.check_operation(op)?;
        }
        self.operations.extend(ops);
        self.user_gates.merge(&other.user_gates);
        Ok(self)
    }

    /// Label the listed wires (qubits, then classical bits) as input or
    /// output states.
    pub fn add_state(
        &mut self,
        label: impl Into<String>,
        targets: &[usize],
        kind: StateKind,
    ) -> IrResult<&mut Self> {
        let label = label.into();
        let states = match kind {
            StateKind::Input => &mut self.input_states,
            StateKind::Output => &mut self.output_states,
        };
        let len = states.len();
        if let Some(&index) = targets.iter().find(|&&t| t >= len) {
            return Err(IrError::IndexOutOfRange { index, len });
        }
        for &t in targets {
            states[t] = Some(label.clone());
        }
        Ok(self)
    }

    /// A copy with the operations in reverse order.
    #[must_use]
    pub fn reverse_circuit(&self) -> Self {
        let mut reversed = self.clone();
        reversed.operations.reverse();
        reversed
    }

    /// Remove and return the operation at `index`.
    pub fn remove_operation(&mut self, index: usize) -> IrResult<Operation> {
        let len = self.operations.len();
        if index >= len {
            return Err(IrError::IndexOutOfRange { index, len });
        }
        Ok(self.operations.remove(index))
    }

    /// Remove operations called `name`; returns how many were removed.
    pub fn remove_by_name(&mut self, name: &str, mode: RemoveMode) -> usize {
        let position = match mode {
            RemoveMode::First => self.operations.iter().position(|op| op.name() == name),
            RemoveMode::Last => self.operations.iter().rposition(|op| op.name() == name),
            RemoveMode::All => {
                let before = self.operations.len();
                self.operations.retain(|op| op.name() != name);
                return before - self.operations.len();
            }
        };
        match position {
            Some(index) => {
                self.operations.remove(index);
                1
            }
            None => 0,
        }
    }

    /// Remove and return every operation, keeping the register, labels and
    /// user gates.
    pub fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    // =========================================================================
    // Common gates
    // =========================================================================

    /// Append a Hadamard gate.
    pub fn snot(&mut self, qubit: usize) -> IrResult<&mut Self> {
        self.add_gate(Gate::new(GateName::Snot, &[qubit])?)
    }

    /// Append a Pauli-X gate.
    pub fn x(&mut self, qubit: usize) -> IrResult<&mut Self> {
        self.add_gate(Gate::new(GateName::X, &[qubit])?)
    }

    /// Append a Pauli-Z gate.
    pub fn z(&mut self, qubit: usize) -> IrResult<&mut Self> {
        self.add_gate(Gate::new(GateName::Z, &[qubit])?)
    }

    /// Append a CNOT gate.
    pub fn cnot(&mut self, control: usize, target: usize) -> IrResult<&mut Self> {
        self.add_gate(Gate::controlled(GateName::Cnot, &[control], &[target])?)
    }

    /// Append a SWAP gate.
    pub fn swap(&mut self, q1: usize, q2: usize) -> IrResult<&mut Self> {
        self.add_gate(Gate::new(GateName::Swap, &[q1, q2])?)
    }

    /// Append a measurement of `qubit` named `M{qubit}` storing into `cbit`.
    pub fn measure(&mut self, qubit: usize, cbit: usize) -> IrResult<&mut Self> {
        self.add_measurement(Measurement::new(format!("M{qubit}"), &[qubit], Some(cbit))?)
    }

    // =========================================================================
    // Propagators
    // =========================================================================

    /// One matrix per gate, measurements skipped.
    ///
    /// With `expand` every matrix acts on the whole register; otherwise each
    /// acts on the gate's own `controls ++ targets`. `GLOBALPHASE` always
    /// covers the whole register.
    pub fn propagators(&self, expand: bool) -> IrResult<Vec<Operator>> {
        self.gates()
            .map(|gate| {
                if expand || *gate.name() == GateName::GlobalPhase {
                    gate.operator(&self.dims, &self.user_gates)
                } else {
                    gate.local_operator(&self.user_gates)
                }
            })
            .collect()
    }

    /// Qubits each unexpanded propagator acts on, in the order of
    /// [`QubitCircuit::propagators`].
    pub fn propagator_qubits(&self) -> Vec<Vec<usize>> {
        self.gates()
            .map(|gate| {
                if *gate.name() == GateName::GlobalPhase {
                    (0..self.num_qubits).collect()
                } else {
                    gate.qubits()
                }
            })
            .collect()
    }

    /// The unitary of the whole circuit.
    ///
    /// Fails for circuits containing measurements or classically controlled
    /// gates. An empty circuit yields the identity.
    pub fn compute_unitary(&self) -> IrResult<Operator> {
        for op in &self.operations {
            match op {
                Operation::Measurement(m) => {
                    return Err(IrError::NotUnitary(format!(
                        "contains measurement '{}'",
                        m.name()
                    )));
                }
                Operation::Gate(g) if g.classical_controls().is_some() => {
                    return Err(IrError::NotUnitary(format!(
                        "gate '{}' is classically controlled",
                        g.name()
                    )));
                }
                Operation::Gate(_) => {}
            }
        }
        if self.operations.is_empty() {
            return Ok(Operator::identity(&self.dims));
        }
        gate_sequence_product(&self.propagators(true)?, ProductOrder::LeftToRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(circuit: &QubitCircuit) -> Vec<&str> {
        circuit.operations().iter().map(Operation::name).collect()
    }

    #[test]
    fn test_range_checks() {
        let mut qc = QubitCircuit::with_cbits(2, 1);
        assert_eq!(
            qc.add_gate(Gate::new("X", &[2]).unwrap()).unwrap_err(),
            IrError::QubitOutOfRange {
                qubit: 2,
                num_qubits: 2
            }
        );
        assert_eq!(
            qc.add_measurement(Measurement::new("M", &[0], Some(1)).unwrap())
                .unwrap_err(),
            IrError::ClbitOutOfRange {
                clbit: 1,
                num_cbits: 1
            }
        );
        let conditioned = Gate::builder("X")
            .target(0)
            .classical_controls([3])
            .build()
            .unwrap();
        assert!(matches!(
            qc.add_gate(conditioned),
            Err(IrError::ClbitOutOfRange { clbit: 3, .. })
        ));
        assert!(qc.is_empty());
    }

    #[test]
    fn test_add_gate_at_out_of_range() {
        let mut qc = QubitCircuit::new(1);
        qc.x(0).unwrap();
        let gate = Gate::new("Z", &[0]).unwrap();
        assert_eq!(
            qc.add_gate_at(gate.clone(), &[2]).unwrap_err(),
            IrError::IndexOutOfRange { index: 2, len: 1 }
        );
        qc.add_gate_at(gate, &[1, 0]).unwrap();
        assert_eq!(names(&qc), vec!["Z", "X", "Z"]);
    }

    #[test]
    fn test_add_1q_gate_rejects_multi_qubit() {
        let mut qc = QubitCircuit::new(3);
        assert!(qc.add_1q_gate("CNOT", 0, None, None).is_err());
        qc.add_1q_gate("SNOT", 0, None, None).unwrap();
        assert_eq!(qc.len(), 3);
    }

    #[test]
    fn test_remove_by_name_modes() {
        let mut qc = QubitCircuit::new(2);
        qc.x(0).unwrap().z(1).unwrap().x(1).unwrap().x(0).unwrap();

        assert_eq!(qc.remove_by_name("X", RemoveMode::Last), 1);
        assert_eq!(qc.operations()[2].targets(), &[1]);

        assert_eq!(qc.remove_by_name("X", RemoveMode::First), 1);
        assert_eq!(names(&qc), vec!["Z", "X"]);

        assert_eq!(qc.remove_by_name("X", RemoveMode::All), 1);
        assert_eq!(qc.remove_by_name("X", RemoveMode::All), 0);
        assert_eq!(names(&qc), vec!["Z"]);
    }

    #[test]
    fn test_remove_operation() {
        let mut qc = QubitCircuit::new(1);
        qc.x(0).unwrap().z(0).unwrap();
        let removed = qc.remove_operation(0).unwrap();
        assert_eq!(removed.name(), "X");
        assert!(qc.remove_operation(1).is_err());
    }

    #[test]
    fn test_compute_unitary_rejects_measurement() {
        let mut qc = QubitCircuit::with_cbits(1, 1);
        qc.snot(0).unwrap().measure(0, 0).unwrap();
        assert!(matches!(
            qc.compute_unitary(),
            Err(IrError::NotUnitary(_))
        ));
    }

    #[test]
    fn test_empty_circuit_unitary_is_identity() {
        let qc = QubitCircuit::new(2);
        let u = qc.compute_unitary().unwrap();
        assert!(u.approx_eq(&Operator::identity(&[2, 2]), 0.0));
    }

    #[test]
    fn test_with_dims_validation() {
        assert!(QubitCircuit::with_dims(vec![3, 1], 0).is_err());
        let qc = QubitCircuit::with_dims(vec![3, 2], 1).unwrap();
        assert_eq!(qc.num_qubits(), 2);
        assert_eq!(qc.input_states().len(), 3);
    }

    #[test]
    fn test_classical_store_requires_qubit() {
        let mut qc = QubitCircuit::with_dims(vec![3, 2], 1).unwrap();
        assert!(matches!(
            qc.measure(0, 0).unwrap_err(),
            IrError::InvalidMeasurement { .. }
        ));
        assert!(qc.measure(1, 0).is_ok());
        let unstored = Measurement::new("M0", &[0], None).unwrap();
        assert!(qc.add_measurement(unstored).is_ok());
        assert_eq!(qc.len(), 2);
    }
}
