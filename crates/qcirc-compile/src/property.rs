//! Compile targets and the property set shared between passes.

use std::any::{Any, TypeId};
use std::fmt;

use qcirc_ir::GateName;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// The entangling gate a resolved circuit may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TwoQubitBasis {
    /// Controlled-NOT.
    #[default]
    Cnot,
    /// Controlled sign flip.
    Csign,
    /// iSWAP.
    Iswap,
    /// Square root of SWAP.
    SqrtSwap,
    /// Square root of iSWAP.
    SqrtIswap,
}

impl TwoQubitBasis {
    /// The gate this entangler corresponds to.
    pub fn gate_name(self) -> GateName {
        match self {
            TwoQubitBasis::Cnot => GateName::Cnot,
            TwoQubitBasis::Csign => GateName::Csign,
            TwoQubitBasis::Iswap => GateName::Iswap,
            TwoQubitBasis::SqrtSwap => GateName::SqrtSwap,
            TwoQubitBasis::SqrtIswap => GateName::SqrtIswap,
        }
    }

    /// Parse a gate name into an entangler.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CNOT" => Some(TwoQubitBasis::Cnot),
            "CSIGN" => Some(TwoQubitBasis::Csign),
            "ISWAP" => Some(TwoQubitBasis::Iswap),
            "SQRTSWAP" => Some(TwoQubitBasis::SqrtSwap),
            "SQRTISWAP" => Some(TwoQubitBasis::SqrtIswap),
            _ => None,
        }
    }
}

/// A single-qubit rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RotationAxis {
    /// `RX`.
    X,
    /// `RY`.
    Y,
    /// `RZ`.
    Z,
}

impl RotationAxis {
    /// The rotation gate about this axis.
    pub fn gate_name(self) -> GateName {
        match self {
            RotationAxis::X => GateName::Rx,
            RotationAxis::Y => GateName::Ry,
            RotationAxis::Z => GateName::Rz,
        }
    }

    /// The axis of a rotation gate.
    pub fn of(name: &GateName) -> Option<Self> {
        match name {
            GateName::Rx => Some(RotationAxis::X),
            GateName::Ry => Some(RotationAxis::Y),
            GateName::Rz => Some(RotationAxis::Z),
            _ => None,
        }
    }
}

/// A target gate set: one entangler plus at least two rotation axes.
///
/// `GLOBALPHASE` is always part of the basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basis {
    two_qubit: TwoQubitBasis,
    rotations: Vec<RotationAxis>,
}

impl Basis {
    /// Create a basis. Duplicate axes are ignored; fewer than two distinct
    /// axes cannot express every single-qubit gate and are rejected.
    pub fn new(
        two_qubit: TwoQubitBasis,
        rotations: impl IntoIterator<Item = RotationAxis>,
    ) -> CompileResult<Self> {
        let mut rotations: Vec<RotationAxis> = rotations.into_iter().collect();
        rotations.sort_unstable();
        rotations.dedup();
        if rotations.len() < 2 {
            return Err(CompileError::InvalidBasis(format!(
                "need at least two rotation axes, got {rotations:?}"
            )));
        }
        Ok(Self {
            two_qubit,
            rotations,
        })
    }

    /// Create a basis from gate names, e.g. `("ISWAP", &["RX", "RZ"])`.
    pub fn from_names(two_qubit: &str, one_qubit: &[&str]) -> CompileResult<Self> {
        let entangler = TwoQubitBasis::from_name(two_qubit).ok_or_else(|| {
            CompileError::InvalidBasis(format!("'{two_qubit}' is not a supported entangler"))
        })?;
        let axes = one_qubit
            .iter()
            .map(|name| {
                RotationAxis::of(&GateName::from_name(name)).ok_or_else(|| {
                    CompileError::InvalidBasis(format!("'{name}' is not a rotation gate"))
                })
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Self::new(entangler, axes)
    }

    /// The entangling gate.
    pub fn two_qubit(&self) -> TwoQubitBasis {
        self.two_qubit
    }

    /// The allowed rotation axes, sorted.
    pub fn rotations(&self) -> &[RotationAxis] {
        &self.rotations
    }

    /// Whether rotations about `axis` are allowed.
    pub fn allows_rotation(&self, axis: RotationAxis) -> bool {
        self.rotations.contains(&axis)
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, name: &GateName) -> bool {
        if *name == GateName::GlobalPhase || *name == self.two_qubit.gate_name() {
            return true;
        }
        RotationAxis::of(name).is_some_and(|axis| self.allows_rotation(axis))
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            two_qubit: TwoQubitBasis::Cnot,
            rotations: vec![RotationAxis::X, RotationAxis::Y, RotationAxis::Z],
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rotations: Vec<String> = self
            .rotations
            .iter()
            .map(|axis| axis.gate_name().to_string())
            .collect();
        write!(
            f,
            "{}+{{{}}}",
            self.two_qubit.gate_name(),
            rotations.join(",")
        )
    }
}

/// Properties shared between compilation passes.
///
/// The target basis has a dedicated field. Passes store anything else with
/// the type-keyed [`insert`](Self::insert) and [`get`](Self::get) methods;
/// each type holds at most one value.
///
/// # Examples
///
/// ```
/// use qcirc_compile::{Basis, PropertySet, TwoQubitBasis};
///
/// let props = PropertySet::new().with_basis(Basis::default());
/// assert_eq!(props.basis.as_ref().unwrap().two_qubit(), TwoQubitBasis::Cnot);
/// ```
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target basis for gate resolution.
    pub basis: Option<Basis>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis: Basis) -> Self {
        self.basis = Some(basis);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
