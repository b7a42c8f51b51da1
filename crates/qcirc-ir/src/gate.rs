//! Quantum gate operands.

use std::fmt;

use num_complex::Complex64;
use qcirc_linalg::Operator;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::matrices;
use crate::registry::UserGateRegistry;

/// Gate names: the standard vocabulary plus user-defined gates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateName {
    // Single-qubit gates
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Phase gate `diag(1, i)`.
    S,
    /// π/8 gate `diag(1, e^{iπ/4})`.
    T,
    /// Hadamard gate.
    Snot,
    /// Square root of NOT.
    SqrtNot,
    /// Rotation around X.
    Rx,
    /// Rotation around Y.
    Ry,
    /// Rotation around Z.
    Rz,
    /// Relative phase `diag(1, e^{iθ})`.
    PhaseGate,
    /// Universal single-qubit gate U(θ, φ, λ).
    QasmU,

    // Controlled single-qubit gates
    /// Controlled-NOT.
    Cnot,
    /// Controlled sign flip; same matrix as `CZ`.
    Csign,
    /// Controlled-Y.
    Cy,
    /// Controlled-Z.
    Cz,
    /// Controlled-S.
    Cs,
    /// Controlled-T.
    Ct,
    /// Controlled rotation around X.
    Crx,
    /// Controlled rotation around Y.
    Cry,
    /// Controlled rotation around Z.
    Crz,
    /// Controlled phase.
    Cphase,

    // Two-qubit gates
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    Iswap,
    /// Square root of SWAP.
    SqrtSwap,
    /// Square root of iSWAP.
    SqrtIswap,
    /// Berkeley B gate.
    Berkeley,
    /// SWAP raised to a power α.
    SwapAlpha,

    // Three-qubit gates
    /// Toffoli (CCX).
    Toffoli,
    /// Fredkin (CSWAP).
    Fredkin,

    /// Global phase on the whole register.
    GlobalPhase,

    /// A gate whose matrix comes from the circuit's user-gate registry.
    User(String),
}

/// The kind of argument a standard gate takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// No argument.
    None,
    /// A single angle.
    Scalar,
    /// Three angles (θ, φ, λ).
    Angles3,
}

/// Operand shape of a standard gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Number of control qubits.
    pub controls: usize,
    /// Number of target qubits.
    pub targets: usize,
    /// Required argument.
    pub arg: ArgKind,
}

const fn sig(controls: usize, targets: usize, arg: ArgKind) -> Signature {
    Signature {
        controls,
        targets,
        arg,
    }
}

impl GateName {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &str {
        match self {
            GateName::X => "X",
            GateName::Y => "Y",
            GateName::Z => "Z",
            GateName::S => "S",
            GateName::T => "T",
            GateName::Snot => "SNOT",
            GateName::SqrtNot => "SQRTNOT",
            GateName::Rx => "RX",
            GateName::Ry => "RY",
            GateName::Rz => "RZ",
            GateName::PhaseGate => "PHASEGATE",
            GateName::QasmU => "QASMU",
            GateName::Cnot => "CNOT",
            GateName::Csign => "CSIGN",
            GateName::Cy => "CY",
            GateName::Cz => "CZ",
            GateName::Cs => "CS",
            GateName::Ct => "CT",
            GateName::Crx => "CRX",
            GateName::Cry => "CRY",
            GateName::Crz => "CRZ",
            GateName::Cphase => "CPHASE",
            GateName::Swap => "SWAP",
            GateName::Iswap => "ISWAP",
            GateName::SqrtSwap => "SQRTSWAP",
            GateName::SqrtIswap => "SQRTISWAP",
            GateName::Berkeley => "BERKELEY",
            GateName::SwapAlpha => "SWAPALPHA",
            GateName::Toffoli => "TOFFOLI",
            GateName::Fredkin => "FREDKIN",
            GateName::GlobalPhase => "GLOBALPHASE",
            GateName::User(name) => name,
        }
    }

    /// Look up a name; anything outside the standard vocabulary is a user gate.
    pub fn from_name(name: &str) -> Self {
        match name {
            "X" => GateName::X,
            "Y" => GateName::Y,
            "Z" => GateName::Z,
            "S" => GateName::S,
            "T" => GateName::T,
            "SNOT" => GateName::Snot,
            "SQRTNOT" => GateName::SqrtNot,
            "RX" => GateName::Rx,
            "RY" => GateName::Ry,
            "RZ" => GateName::Rz,
            "PHASEGATE" => GateName::PhaseGate,
            "QASMU" => GateName::QasmU,
            "CNOT" => GateName::Cnot,
            "CSIGN" => GateName::Csign,
            "CY" => GateName::Cy,
            "CZ" => GateName::Cz,
            "CS" => GateName::Cs,
            "CT" => GateName::Ct,
            "CRX" => GateName::Crx,
            "CRY" => GateName::Cry,
            "CRZ" => GateName::Crz,
            "CPHASE" => GateName::Cphase,
            "SWAP" => GateName::Swap,
            "ISWAP" => GateName::Iswap,
            "SQRTSWAP" => GateName::SqrtSwap,
            "SQRTISWAP" => GateName::SqrtIswap,
            "BERKELEY" => GateName::Berkeley,
            "SWAPALPHA" => GateName::SwapAlpha,
            "TOFFOLI" => GateName::Toffoli,
            "FREDKIN" => GateName::Fredkin,
            "GLOBALPHASE" => GateName::GlobalPhase,
            other => GateName::User(other.to_string()),
        }
    }

    /// Operand shape, or `None` for user gates.
    pub fn signature(&self) -> Option<Signature> {
        use ArgKind::{Angles3, Scalar};
        let signature = match self {
            GateName::X
            | GateName::Y
            | GateName::Z
            | GateName::S
            | GateName::T
            | GateName::Snot
            | GateName::SqrtNot => sig(0, 1, ArgKind::None),

            GateName::Rx | GateName::Ry | GateName::Rz | GateName::PhaseGate => sig(0, 1, Scalar),

            GateName::QasmU => sig(0, 1, Angles3),

            GateName::Cnot
            | GateName::Csign
            | GateName::Cy
            | GateName::Cz
            | GateName::Cs
            | GateName::Ct => sig(1, 1, ArgKind::None),

            GateName::Crx | GateName::Cry | GateName::Crz | GateName::Cphase => sig(1, 1, Scalar),

            GateName::Swap
            | GateName::Iswap
            | GateName::SqrtSwap
            | GateName::SqrtIswap
            | GateName::Berkeley => sig(0, 2, ArgKind::None),

            GateName::SwapAlpha => sig(0, 2, Scalar),
            GateName::Toffoli => sig(2, 1, ArgKind::None),
            GateName::Fredkin => sig(1, 2, ArgKind::None),
            GateName::GlobalPhase => sig(0, 0, Scalar),

            GateName::User(_) => return None,
        };
        Some(signature)
    }

    /// Whether this is a user-defined gate.
    pub fn is_user(&self) -> bool {
        matches!(self, GateName::User(_))
    }

    /// Whether this is a standard gate on exactly one qubit.
    pub fn is_single_qubit(&self) -> bool {
        self.signature()
            .is_some_and(|s| s.controls == 0 && s.targets == 1)
    }
}

impl fmt::Display for GateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for GateName {
    fn from(name: &str) -> Self {
        GateName::from_name(name)
    }
}

/// Numeric gate parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GateArg {
    /// A single value, e.g. a rotation angle.
    Scalar(f64),
    /// Several values, e.g. the three `QASMU` angles.
    Vector(Vec<f64>),
}

impl GateArg {
    /// The value if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            GateArg::Scalar(v) => Some(*v),
            GateArg::Vector(_) => None,
        }
    }

    /// All values as a slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            GateArg::Scalar(v) => std::slice::from_ref(v),
            GateArg::Vector(v) => v,
        }
    }
}

impl From<f64> for GateArg {
    fn from(value: f64) -> Self {
        GateArg::Scalar(value)
    }
}

impl From<Vec<f64>> for GateArg {
    fn from(values: Vec<f64>) -> Self {
        GateArg::Vector(values)
    }
}

/// Classical condition on a gate: the listed bits, read most significant
/// first, must equal `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClassicalControl")]
pub struct ClassicalControl {
    bits: Vec<usize>,
    value: u64,
}

/// Unchecked serialized form of [`ClassicalControl`].
#[derive(Deserialize)]
struct RawClassicalControl {
    bits: Vec<usize>,
    value: u64,
}

impl TryFrom<RawClassicalControl> for ClassicalControl {
    type Error = IrError;

    fn try_from(raw: RawClassicalControl) -> IrResult<Self> {
        let control = Self {
            bits: raw.bits,
            value: raw.value,
        };
        control.validate("classical control")?;
        Ok(control)
    }
}

impl ClassicalControl {
    /// Condition on all listed bits being 1.
    pub fn new(bits: Vec<usize>) -> Self {
        let value = match bits.len() {
            0 => 0,
            n if n >= 64 => u64::MAX,
            n => (1u64 << n) - 1,
        };
        Self { bits, value }
    }

    /// Require a specific value instead of all ones.
    #[must_use]
    pub fn with_value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    /// Classical bits read by the condition.
    pub fn bits(&self) -> &[usize] {
        &self.bits
    }

    /// Required value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Required value of the `i`-th listed bit, or `None` past the last bit.
    pub fn required_bit(&self, i: usize) -> Option<u8> {
        let shift = self.bits.len().checked_sub(i + 1)?;
        let word = u32::try_from(shift)
            .ok()
            .and_then(|shift| self.value.checked_shr(shift))
            .unwrap_or(0);
        Some(u8::from(word & 1 == 1))
    }

    /// Evaluate the condition against a classical register.
    ///
    /// Returns `Err(bit)` with the first referenced bit that was never written.
    pub fn evaluate(&self, cbits: &[Option<u8>]) -> Result<bool, usize> {
        let mut satisfied = true;
        for (i, &bit) in self.bits.iter().enumerate() {
            match cbits.get(bit).copied().flatten() {
                Some(v) => satisfied &= Some(v) == self.required_bit(i),
                None => return Err(bit),
            }
        }
        Ok(satisfied)
    }

    fn validate(&self, gate: &str) -> IrResult<()> {
        if self.bits.len() > 64 {
            return Err(IrError::invalid_gate(
                gate,
                "at most 64 classical controls are supported",
            ));
        }
        if self.bits.len() < 64 && self.value >> self.bits.len() != 0 {
            return Err(IrError::invalid_gate(
                gate,
                format!(
                    "classical control value {} does not fit in {} bits",
                    self.value,
                    self.bits.len()
                ),
            ));
        }
        Ok(())
    }
}

/// A quantum gate placed on specific qubits.
///
/// Gates are validated on construction through [`GateBuilder::build`],
/// deserialization included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGate")]
pub struct Gate {
    name: GateName,
    targets: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    controls: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg_value: Option<GateArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classical_controls: Option<ClassicalControl>,
}

/// Unchecked serialized form of [`Gate`].
#[derive(Deserialize)]
struct RawGate {
    name: GateName,
    targets: Vec<usize>,
    #[serde(default)]
    controls: Vec<usize>,
    #[serde(default)]
    arg_value: Option<GateArg>,
    #[serde(default)]
    arg_label: Option<String>,
    #[serde(default)]
    classical_controls: Option<ClassicalControl>,
}

impl TryFrom<RawGate> for Gate {
    type Error = IrError;

    fn try_from(raw: RawGate) -> IrResult<Self> {
        let mut builder = GateBuilder::new(raw.name)
            .targets(raw.targets)
            .controls(raw.controls)
            .classical_control(raw.classical_controls);
        if let Some(value) = raw.arg_value {
            builder = builder.arg_value(value);
        }
        if let Some(label) = raw.arg_label {
            builder = builder.arg_label(label);
        }
        builder.build()
    }
}

impl Gate {
    /// Start building a gate.
    pub fn builder(name: impl Into<GateName>) -> GateBuilder {
        GateBuilder::new(name.into())
    }

    /// An unparameterized gate on `targets`.
    pub fn new(name: impl Into<GateName>, targets: &[usize]) -> IrResult<Self> {
        Self::builder(name).targets(targets.iter().copied()).build()
    }

    /// An unparameterized gate with controls.
    pub fn controlled(
        name: impl Into<GateName>,
        controls: &[usize],
        targets: &[usize],
    ) -> IrResult<Self> {
        Self::builder(name)
            .controls(controls.iter().copied())
            .targets(targets.iter().copied())
            .build()
    }

    /// A parameterized gate on `targets`.
    pub fn with_arg(name: impl Into<GateName>, targets: &[usize], arg: f64) -> IrResult<Self> {
        Self::builder(name)
            .targets(targets.iter().copied())
            .arg(arg)
            .build()
    }

    /// Gate name.
    pub fn name(&self) -> &GateName {
        &self.name
    }

    /// Target qubits.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Control qubits.
    pub fn controls(&self) -> &[usize] {
        &self.controls
    }

    /// Numeric parameter.
    pub fn arg_value(&self) -> Option<&GateArg> {
        self.arg_value.as_ref()
    }

    /// Scalar parameter, if any.
    pub fn scalar_arg(&self) -> Option<f64> {
        self.arg_value.as_ref().and_then(GateArg::as_scalar)
    }

    /// Display label of the parameter.
    pub fn arg_label(&self) -> Option<&str> {
        self.arg_label.as_deref()
    }

    /// Classical condition.
    pub fn classical_controls(&self) -> Option<&ClassicalControl> {
        self.classical_controls.as_ref()
    }

    /// All qubits the local matrix acts on: `controls ++ targets`.
    pub fn qubits(&self) -> Vec<usize> {
        self.controls
            .iter()
            .chain(self.targets.iter())
            .copied()
            .collect()
    }

    /// Replace the classical condition.
    #[must_use]
    pub fn with_classical_controls(mut self, control: Option<ClassicalControl>) -> Self {
        self.classical_controls = control;
        self
    }

    /// Relabel every qubit through `f`, keeping roles and order.
    ///
    /// `f` must be injective on this gate's qubits.
    #[must_use]
    pub fn map_qubits(&self, f: impl Fn(usize) -> usize) -> Self {
        let mut gate = self.clone();
        gate.targets.iter_mut().for_each(|q| *q = f(*q));
        gate.controls.iter_mut().for_each(|q| *q = f(*q));
        gate
    }

    /// Matrix on `controls ++ targets`.
    ///
    /// `GLOBALPHASE` acts on no qubits and yields a 1x1 phase.
    pub fn local_operator(&self, registry: &UserGateRegistry) -> IrResult<Operator> {
        let angle = || self.scalar_arg().unwrap_or_default();
        match &self.name {
            GateName::X => matrices::x(),
            GateName::Y => matrices::y(),
            GateName::Z => matrices::z(),
            GateName::S => matrices::s(),
            GateName::T => matrices::t(),
            GateName::Snot => matrices::snot(),
            GateName::SqrtNot => matrices::sqrtnot(),
            GateName::Rx => matrices::rx(angle()),
            GateName::Ry => matrices::ry(angle()),
            GateName::Rz => matrices::rz(angle()),
            GateName::PhaseGate => matrices::phasegate(angle()),
            GateName::QasmU => match self.arg_value.as_ref().map(GateArg::as_slice) {
                Some(&[theta, phi, lambda]) => matrices::qasmu(theta, phi, lambda),
                _ => Err(IrError::invalid_gate("QASMU", "expects three angles")),
            },
            GateName::Cnot => matrices::cnot(),
            GateName::Csign | GateName::Cz => matrices::cz(),
            GateName::Cy => matrices::cy(),
            GateName::Cs => matrices::cs(),
            GateName::Ct => matrices::ct(),
            GateName::Crx => matrices::controlled(&matrices::rx(angle())?),
            GateName::Cry => matrices::controlled(&matrices::ry(angle())?),
            GateName::Crz => matrices::controlled(&matrices::rz(angle())?),
            GateName::Cphase => matrices::controlled(&matrices::phasegate(angle())?),
            GateName::Swap => matrices::swap(),
            GateName::Iswap => matrices::iswap(),
            GateName::SqrtSwap => matrices::sqrtswap(),
            GateName::SqrtIswap => matrices::sqrtiswap(),
            GateName::Berkeley => matrices::berkeley(),
            GateName::SwapAlpha => matrices::swapalpha(angle()),
            GateName::Toffoli => matrices::toffoli(),
            GateName::Fredkin => matrices::fredkin(),
            GateName::GlobalPhase => Ok(Operator::scalar(Complex64::from_polar(1.0, angle()))),
            GateName::User(name) => registry.matrix(name, self.arg_value.as_ref()),
        }
    }

    /// Matrix on the full register with subsystem dimensions `dims`.
    pub fn operator(&self, dims: &[usize], registry: &UserGateRegistry) -> IrResult<Operator> {
        if let Some(&qubit) = self.qubits().iter().find(|&&q| q >= dims.len()) {
            return Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: dims.len(),
            });
        }
        if self.name == GateName::GlobalPhase {
            let angle = self.scalar_arg().unwrap_or_default();
            return Ok(matrices::globalphase(angle, dims));
        }
        let local = self.local_operator(registry)?;
        Ok(local.expand(dims, &self.qubits())?)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(arg) = &self.arg_value {
            write!(f, "({:?})", arg.as_slice())?;
        }
        if !self.controls.is_empty() {
            write!(f, " c={:?}", self.controls)?;
        }
        if !self.targets.is_empty() {
            write!(f, " t={:?}", self.targets)?;
        }
        Ok(())
    }
}

/// Builder for [`Gate`].
#[derive(Debug, Clone)]
pub struct GateBuilder {
    gate: Gate,
}

impl GateBuilder {
    fn new(name: GateName) -> Self {
        Self {
            gate: Gate {
                name,
                targets: vec![],
                controls: vec![],
                arg_value: None,
                arg_label: None,
                classical_controls: None,
            },
        }
    }

    /// Add a target qubit.
    #[must_use]
    pub fn target(mut self, qubit: usize) -> Self {
        self.gate.targets.push(qubit);
        self
    }

    /// Add target qubits.
    #[must_use]
    pub fn targets(mut self, qubits: impl IntoIterator<Item = usize>) -> Self {
        self.gate.targets.extend(qubits);
        self
    }

    /// Add a control qubit.
    #[must_use]
    pub fn control(mut self, qubit: usize) -> Self {
        self.gate.controls.push(qubit);
        self
    }

    /// Add control qubits.
    #[must_use]
    pub fn controls(mut self, qubits: impl IntoIterator<Item = usize>) -> Self {
        self.gate.controls.extend(qubits);
        self
    }

    /// Set a scalar parameter.
    #[must_use]
    pub fn arg(mut self, value: f64) -> Self {
        self.gate.arg_value = Some(GateArg::Scalar(value));
        self
    }

    /// Set an arbitrary parameter.
    #[must_use]
    pub fn arg_value(mut self, value: impl Into<GateArg>) -> Self {
        self.gate.arg_value = Some(value.into());
        self
    }

    /// Set the parameter's display label.
    #[must_use]
    pub fn arg_label(mut self, label: impl Into<String>) -> Self {
        self.gate.arg_label = Some(label.into());
        self
    }

    /// Condition the gate on classical bits being all ones.
    #[must_use]
    pub fn classical_controls(mut self, bits: impl IntoIterator<Item = usize>) -> Self {
        self.gate.classical_controls = Some(ClassicalControl::new(bits.into_iter().collect()));
        self
    }

    /// Required value of the classical controls, most significant bit first.
    #[must_use]
    pub fn classical_control_value(mut self, value: u64) -> Self {
        if let Some(control) = self.gate.classical_controls.take() {
            self.gate.classical_controls = Some(control.with_value(value));
        }
        self
    }

    /// Set a prepared classical condition.
    #[must_use]
    pub fn classical_control(mut self, control: Option<ClassicalControl>) -> Self {
        self.gate.classical_controls = control;
        self
    }

    /// Validate and produce the gate.
    pub fn build(self) -> IrResult<Gate> {
        let gate = self.gate;
        let name = gate.name.as_str();

        match gate.name.signature() {
            Some(signature) => {
                if gate.controls.len() != signature.controls {
                    return Err(IrError::invalid_gate(
                        name,
                        format!(
                            "expects {} control(s), got {}",
                            signature.controls,
                            gate.controls.len()
                        ),
                    ));
                }
                if gate.targets.len() != signature.targets {
                    return Err(IrError::invalid_gate(
                        name,
                        format!(
                            "expects {} target(s), got {}",
                            signature.targets,
                            gate.targets.len()
                        ),
                    ));
                }
                check_arg(name, signature.arg, gate.arg_value.as_ref())?;
            }
            None => {
                if gate.targets.is_empty() {
                    return Err(IrError::invalid_gate(name, "requires at least one target"));
                }
            }
        }

        let qubits = gate.qubits();
        for (i, q) in qubits.iter().enumerate() {
            if qubits[..i].contains(q) {
                return Err(IrError::invalid_gate(
                    name,
                    format!("qubit {q} appears more than once among targets and controls"),
                ));
            }
        }

        if let Some(control) = &gate.classical_controls {
            control.validate(name)?;
        }

        Ok(gate)
    }
}

fn check_arg(name: &str, kind: ArgKind, arg: Option<&GateArg>) -> IrResult<()> {
    match (kind, arg) {
        (ArgKind::None, None)
        | (ArgKind::Scalar, Some(GateArg::Scalar(_))) => Ok(()),
        (ArgKind::Angles3, Some(GateArg::Vector(v))) if v.len() == 3 => Ok(()),
        (ArgKind::None, Some(_)) => Err(IrError::invalid_gate(name, "takes no argument")),
        (ArgKind::Scalar, _) => Err(IrError::invalid_gate(name, "requires a scalar argument")),
        (ArgKind::Angles3, _) => Err(IrError::invalid_gate(name, "requires three angles")),
    }
}
