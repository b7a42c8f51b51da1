//! Per-circuit registry of user-defined gate matrices.

use std::fmt;
use std::sync::Arc;

use qcirc_linalg::Operator;
use rustc_hash::FxHashMap;

use crate::error::{IrError, IrResult};
use crate::gate::GateArg;

/// Function producing a user gate's local matrix from its argument.
pub type UserGateFn = Arc<dyn Fn(Option<&GateArg>) -> Operator + Send + Sync>;

/// Maps user gate names to matrix-producing functions.
///
/// The returned matrix acts on the gate's `controls ++ targets`, first qubit
/// most significant, and its subsystem dimensions must match the register.
#[derive(Clone, Default)]
pub struct UserGateRegistry {
    gates: FxHashMap<String, UserGateFn>,
}

impl UserGateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a gate definition.
    pub fn insert<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Option<&GateArg>) -> Operator + Send + Sync + 'static,
    {
        self.gates.insert(name.into(), Arc::new(f));
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Registered function for `name`.
    pub fn get(&self, name: &str) -> Option<&UserGateFn> {
        self.gates.get(name)
    }

    /// Evaluate the matrix of `name` for `arg`.
    pub fn matrix(&self, name: &str, arg: Option<&GateArg>) -> IrResult<Operator> {
        let f = self
            .gates
            .get(name)
            .ok_or_else(|| IrError::UnknownGate(name.to_string()))?;
        Ok(f(arg))
    }

    /// Copy every definition of `other` into `self`, overwriting duplicates.
    pub fn merge(&mut self, other: &UserGateRegistry) {
        for (name, f) in &other.gates {
            self.gates.insert(name.clone(), Arc::clone(f));
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.gates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether no gate is registered.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Whether both registries hold the same function objects under the same names.
    pub fn same_definitions(&self, other: &UserGateRegistry) -> bool {
        self.gates.len() == other.gates.len()
            && self.gates.iter().all(|(name, f)| {
                other
                    .gates
                    .get(name)
                    .is_some_and(|g| Arc::ptr_eq(f, g))
            })
    }
}

impl fmt::Debug for UserGateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserGateRegistry")
            .field("gates", &self.names())
            .finish()
    }
}
