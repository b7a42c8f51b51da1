//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qcirc_ir::QubitCircuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    AdjacentGates, EQUIVALENCE_TOLERANCE, EquivalenceCheck, RecordUnitary, ResolveGates,
};
use crate::property::{Basis, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(
        &self,
        circuit: &mut QubitCircuit,
        properties: &mut PropertySet,
    ) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!("Pass manager completed, ops: {}", circuit.len());
        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Insert nearest-neighbour swaps before resolution.
    adjacent: bool,
    /// Bracket the pipeline with an equivalence check.
    verify: bool,
    /// Accepted distance for the equivalence check.
    tolerance: f64,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            adjacent: false,
            verify: false,
            tolerance: EQUIVALENCE_TOLERANCE,
            properties: PropertySet::new(),
        }
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis: Basis) -> Self {
        self.properties.basis = Some(basis);
        self
    }

    /// Make every gate act on neighbouring qubits.
    #[must_use]
    pub fn with_adjacent_gates(mut self, enabled: bool) -> Self {
        self.adjacent = enabled;
        self
    }

    /// Verify that the compiled circuit keeps the original unitary.
    #[must_use]
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Verify with a custom tolerance instead of [`EQUIVALENCE_TOLERANCE`].
    #[must_use]
    pub fn with_verification_tolerance(mut self, tolerance: f64) -> Self {
        self.verify = true;
        self.tolerance = tolerance;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.verify {
            pm.add_pass(RecordUnitary);
        }
        if self.adjacent {
            pm.add_pass(AdjacentGates);
        }
        if self.properties.basis.is_some() {
            pm.add_pass(ResolveGates);
        }
        if self.verify {
            pm.add_pass(EquivalenceCheck::with_tolerance(self.tolerance));
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
