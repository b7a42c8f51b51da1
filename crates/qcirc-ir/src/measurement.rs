//! Projective measurements in the computational basis.

use qcirc_linalg::{Ket, Operator};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Outcomes with probability below this are treated as impossible.
pub const PROBABILITY_TOLERANCE: f64 = 1e-12;

/// A computational-basis measurement of one or more qubits.
///
/// Outcome `k` enumerates the joint basis states of `targets`, first target
/// most significant. A classical store is only allowed for a single target,
/// where the stored bit is the measured level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct Measurement {
    name: String,
    targets: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classical_store: Option<usize>,
}

#[derive(Deserialize)]
struct RawMeasurement {
    name: String,
    targets: Vec<usize>,
    #[serde(default)]
    classical_store: Option<usize>,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = IrError;

    fn try_from(raw: RawMeasurement) -> IrResult<Self> {
        Self::new(raw.name, &raw.targets, raw.classical_store)
    }
}

impl Measurement {
    /// Create a measurement, validating its operands.
    pub fn new(
        name: impl Into<String>,
        targets: &[usize],
        classical_store: Option<usize>,
    ) -> IrResult<Self> {
        let name = name.into();
        if targets.is_empty() {
            return Err(IrError::InvalidMeasurement {
                name,
                reason: "requires at least one target".into(),
            });
        }
        for (i, q) in targets.iter().enumerate() {
            if targets[..i].contains(q) {
                return Err(IrError::InvalidMeasurement {
                    name,
                    reason: format!("target {q} listed more than once"),
                });
            }
        }
        if classical_store.is_some() && targets.len() != 1 {
            return Err(IrError::InvalidMeasurement {
                name,
                reason: format!(
                    "a classical store needs exactly one target, got {}",
                    targets.len()
                ),
            });
        }
        Ok(Self {
            name,
            targets: targets.to_vec(),
            classical_store,
        })
    }

    /// Measurement label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Measured qubits.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Classical bit receiving the outcome.
    pub fn classical_store(&self) -> Option<usize> {
        self.classical_store
    }

    pub(crate) fn shifted(&self, offset: usize) -> Self {
        Self {
            name: self.name.clone(),
            targets: self.targets.iter().map(|q| q + offset).collect(),
            classical_store: self.classical_store,
        }
    }

    fn check_register(&self, dims: &[usize]) -> IrResult<()> {
        match self.targets.iter().find(|&&q| q >= dims.len()) {
            Some(&qubit) => Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: dims.len(),
            }),
            None => Ok(()),
        }
    }

    /// Number of distinct outcomes on a register with subsystem dims `dims`.
    pub fn num_outcomes(&self, dims: &[usize]) -> IrResult<usize> {
        self.check_register(dims)?;
        Ok(self.targets.iter().map(|&q| dims[q]).product())
    }

    /// Full-register projector onto every outcome, in outcome order.
    pub fn projectors(&self, dims: &[usize]) -> IrResult<Vec<Operator>> {
        self.check_register(dims)?;
        let local_dims: Vec<usize> = self.targets.iter().map(|&q| dims[q]).collect();
        let outcomes: usize = local_dims.iter().product();
        (0..outcomes)
            .map(|k| {
                let levels = digits(k, &local_dims);
                let local = Ket::basis(&local_dims, &levels)?.to_density();
                Ok(local.expand(dims, &self.targets)?)
            })
            .collect()
    }

    /// Collapse a ket onto every outcome.
    ///
    /// Returns the normalized post-measurement state of each outcome
    /// (`None` for impossible outcomes) and the outcome probabilities.
    pub fn measurement_comp_basis(&self, state: &Ket) -> IrResult<(Vec<Option<Ket>>, Vec<f64>)> {
        let mut states = vec![];
        let mut probabilities = vec![];
        for projector in self.projectors(state.dims())? {
            let projected = projector.apply(state)?;
            let probability = projected.norm().powi(2);
            states.push(if probability > PROBABILITY_TOLERANCE {
                Some(projected.normalize()?)
            } else {
                None
            });
            probabilities.push(probability);
        }
        Ok((states, probabilities))
    }

    /// Collapse a density operator onto every outcome.
    pub fn measurement_comp_basis_dm(
        &self,
        rho: &Operator,
    ) -> IrResult<(Vec<Option<Operator>>, Vec<f64>)> {
        let mut states = vec![];
        let mut probabilities = vec![];
        for projector in self.projectors(rho.dims())? {
            let projected = projector.sandwich(rho)?;
            let probability = projected.trace().re;
            states.push(if probability > PROBABILITY_TOLERANCE {
                Some(projected.scale((1.0 / probability).into()))
            } else {
                None
            });
            probabilities.push(probability);
        }
        Ok((states, probabilities))
    }
}

/// Mixed-radix digits of `k`, most significant first.
fn digits(mut k: usize, radices: &[usize]) -> Vec<usize> {
    let mut out = vec![0; radices.len()];
    for (slot, &radix) in out.iter_mut().zip(radices).rev() {
        *slot = k % radix;
        k /= radix;
    }
    out
}
