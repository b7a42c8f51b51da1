//! State vectors over a tensor-product space.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{LinalgError, LinalgResult};
use crate::operator::{Operator, strides, total_dim};

/// A column vector tagged with subsystem dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Ket {
    data: Array1<Complex64>,
    dims: Vec<usize>,
}

impl Ket {
    /// Wrap amplitudes, checking their length against `dims`.
    pub fn new(data: Array1<Complex64>, dims: Vec<usize>) -> LinalgResult<Self> {
        if total_dim(&dims) != data.len() {
            return Err(LinalgError::InvalidDims {
                size: data.len(),
                dims,
            });
        }
        Ok(Self { data, dims })
    }

    /// Build a ket from a list of amplitudes.
    pub fn from_vec(dims: Vec<usize>, amplitudes: Vec<Complex64>) -> LinalgResult<Self> {
        Self::new(Array1::from(amplitudes), dims)
    }

    /// The product basis state `|levels[0], levels[1], ...⟩`.
    pub fn basis(dims: &[usize], levels: &[usize]) -> LinalgResult<Self> {
        if dims.len() != levels.len() {
            return Err(LinalgError::InvalidDims {
                dims: dims.to_vec(),
                size: levels.len(),
            });
        }
        let strides = strides(dims);
        let mut index = 0;
        for (k, (&level, &dim)) in levels.iter().zip(dims).enumerate() {
            if level >= dim {
                return Err(LinalgError::LevelOutOfRange { level, dim });
            }
            index += level * strides[k];
        }
        let mut data = Array1::zeros(total_dim(dims));
        data[index] = Complex64::new(1.0, 0.0);
        Ok(Self {
            data,
            dims: dims.to_vec(),
        })
    }

    /// `|0...0⟩` on the given subsystems.
    pub fn zero_state(dims: &[usize]) -> Self {
        let mut data = Array1::zeros(total_dim(dims));
        data[0] = Complex64::new(1.0, 0.0);
        Self {
            data,
            dims: dims.to_vec(),
        }
    }

    /// Subsystem dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total dimension.
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    /// Amplitudes.
    pub fn data(&self) -> &Array1<Complex64> {
        &self.data
    }

    /// Amplitude of basis state `index`.
    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.data[index]
    }

    /// Kronecker product, `self` on the leading subsystems.
    pub fn tensor(&self, other: &Ket) -> Ket {
        let data: Vec<Complex64> = self
            .data
            .iter()
            .flat_map(|&a| other.data.iter().map(move |&b| a * b))
            .collect();
        let mut dims = self.dims.clone();
        dims.extend_from_slice(&other.dims);
        Self {
            data: Array1::from(data),
            dims,
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Rescale to unit norm.
    pub fn normalize(&self) -> LinalgResult<Ket> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(LinalgError::ZeroNorm);
        }
        Ok(Self {
            data: self.data.mapv(|z| z / norm),
            dims: self.dims.clone(),
        })
    }

    /// Inner product `⟨self|other⟩`.
    pub fn inner(&self, other: &Ket) -> LinalgResult<Complex64> {
        if self.dim() != other.dim() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Overlap `|⟨self|other⟩|`, insensitive to global phase.
    pub fn fidelity(&self, other: &Ket) -> LinalgResult<f64> {
        Ok(self.inner(other)?.norm())
    }

    /// Outer product `|self⟩⟨other|`.
    pub fn outer(&self, other: &Ket) -> LinalgResult<Operator> {
        if self.dim() != other.dim() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        let n = self.dim();
        let data = Array2::from_shape_fn((n, n), |(r, c)| self.data[r] * other.data[c].conj());
        Operator::new(data, self.dims.clone())
    }

    /// Density operator `|ψ⟩⟨ψ|`.
    pub fn to_density(&self) -> Operator {
        let n = self.dim();
        let data = Array2::from_shape_fn((n, n), |(r, c)| self.data[r] * self.data[c].conj());
        Operator::from_parts(data, self.dims.clone())
    }

    /// Reduced density operator of the listed subsystems.
    pub fn ptrace(&self, keep: &[usize]) -> LinalgResult<Operator> {
        self.to_density().ptrace(keep)
    }

    /// Multiply every amplitude by `factor`.
    pub fn scale(&self, factor: Complex64) -> Ket {
        Self {
            data: self.data.mapv(|z| z * factor),
            dims: self.dims.clone(),
        }
    }
}
