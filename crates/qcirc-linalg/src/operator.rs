//! Dense square operators over a tensor-product space.
//!
//! Every [`Operator`] carries the dimensions of the subsystems it acts on.
//! Basis states are ordered with the first subsystem most significant, so
//! `A.tensor(&B)` acts with `A` on subsystem 0 and `B` on subsystem 1.

use ndarray::Array2;
use ndarray::linalg::kron;
use num_complex::Complex64;
use std::ops::{Add, Mul, Sub};

use crate::error::{LinalgError, LinalgResult};
use crate::ket::Ket;

/// Total dimension of a list of subsystems.
pub(crate) fn total_dim(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Row-major strides of each subsystem.
pub(crate) fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Offset inside the full space of every basis state of the listed subsystems.
///
/// Entry `a` is the full-space index contribution of local basis state `a`,
/// where the local space orders `subsystems` as given.
pub(crate) fn subsystem_offsets(dims: &[usize], subsystems: &[usize]) -> Vec<usize> {
    let full_strides = strides(dims);
    let local_dims: Vec<usize> = subsystems.iter().map(|&s| dims[s]).collect();
    let local_strides = strides(&local_dims);
    (0..total_dim(&local_dims))
        .map(|a| {
            subsystems
                .iter()
                .enumerate()
                .map(|(k, &s)| ((a / local_strides[k]) % local_dims[k]) * full_strides[s])
                .sum()
        })
        .collect()
}

/// Check that every index is in range and appears once.
pub(crate) fn check_subsystems(num_subsystems: usize, subsystems: &[usize]) -> LinalgResult<()> {
    let mut seen = vec![false; num_subsystems];
    for &index in subsystems {
        if index >= num_subsystems {
            return Err(LinalgError::SubsystemOutOfRange {
                index,
                num_subsystems,
            });
        }
        if seen[index] {
            return Err(LinalgError::DuplicateSubsystem(index));
        }
        seen[index] = true;
    }
    Ok(())
}

/// A square complex matrix acting on a tensor product of subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    data: Array2<Complex64>,
    dims: Vec<usize>,
}

impl Operator {
    /// Wrap a matrix, checking it is square and matches `dims`.
    pub fn new(data: Array2<Complex64>, dims: Vec<usize>) -> LinalgResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(LinalgError::NotSquare { rows, cols });
        }
        if total_dim(&dims) != rows {
            return Err(LinalgError::InvalidDims { dims, size: rows });
        }
        Ok(Self { data, dims })
    }

    /// Wrap a matrix whose shape is already known to match `dims`.
    pub(crate) fn from_parts(data: Array2<Complex64>, dims: Vec<usize>) -> Self {
        debug_assert_eq!(data.nrows(), total_dim(&dims));
        Self { data, dims }
    }

    /// Build an operator from row-major entries.
    pub fn from_vec(dims: Vec<usize>, entries: Vec<Complex64>) -> LinalgResult<Self> {
        let n = total_dim(&dims);
        let size = entries.len();
        let data = Array2::from_shape_vec((n, n), entries)
            .map_err(|_| LinalgError::InvalidDims { dims: dims.clone(), size })?;
        Ok(Self { data, dims })
    }

    /// Build an operator from real row-major entries.
    pub fn from_real(dims: Vec<usize>, entries: &[f64]) -> LinalgResult<Self> {
        Self::from_vec(dims, entries.iter().map(|&x| Complex64::new(x, 0.0)).collect())
    }

    /// The identity on the given subsystems.
    pub fn identity(dims: &[usize]) -> Self {
        Self {
            data: Array2::eye(total_dim(dims)),
            dims: dims.to_vec(),
        }
    }

    /// The zero operator on the given subsystems.
    pub fn zeros(dims: &[usize]) -> Self {
        let n = total_dim(dims);
        Self {
            data: Array2::zeros((n, n)),
            dims: dims.to_vec(),
        }
    }

    /// A 1x1 operator on no subsystems, the unit of [`Operator::tensor`].
    pub fn scalar(value: Complex64) -> Self {
        Self {
            data: Array2::from_elem((1, 1), value),
            dims: vec![],
        }
    }

    /// `|level⟩⟨level|` on a single subsystem of dimension `dim`.
    pub fn fock_dm(dim: usize, level: usize) -> LinalgResult<Self> {
        if level >= dim {
            return Err(LinalgError::LevelOutOfRange { level, dim });
        }
        let mut op = Self::zeros(&[dim]);
        op.data[[level, level]] = Complex64::new(1.0, 0.0);
        Ok(op)
    }

    /// Subsystem dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total dimension.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// The underlying matrix.
    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Consume the operator and return the matrix.
    pub fn into_data(self) -> Array2<Complex64> {
        self.data
    }

    /// Matrix element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[[row, col]]
    }

    /// Matrix product `self · other`.
    pub fn matmul(&self, other: &Operator) -> LinalgResult<Operator> {
        if self.dim() != other.dim() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        Ok(Self {
            data: self.data.dot(&other.data),
            dims: self.dims.clone(),
        })
    }

    /// Kronecker product, `self` on the leading subsystems.
    pub fn tensor(&self, other: &Operator) -> Operator {
        let mut dims = self.dims.clone();
        dims.extend_from_slice(&other.dims);
        Self {
            data: kron(&self.data, &other.data),
            dims,
        }
    }

    /// Kronecker product of a sequence of operators.
    pub fn tensor_all<'a>(ops: impl IntoIterator<Item = &'a Operator>) -> Operator {
        ops.into_iter()
            .fold(Self::scalar(Complex64::new(1.0, 0.0)), |acc, op| {
                acc.tensor(op)
            })
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Operator {
        Self {
            data: self.data.t().mapv(|z| z.conj()),
            dims: self.dims.clone(),
        }
    }

    /// Multiply every entry by `factor`.
    pub fn scale(&self, factor: Complex64) -> Operator {
        Self {
            data: self.data.mapv(|z| z * factor),
            dims: self.dims.clone(),
        }
    }

    /// Sum of diagonal entries.
    pub fn trace(&self) -> Complex64 {
        self.data.diag().sum()
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(num_complex::Complex::norm_sqr).sum::<f64>().sqrt()
    }

    /// Frobenius distance to `other`; infinite when the shapes differ.
    pub fn distance(&self, other: &Operator) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Entry-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Operator, tol: f64) -> bool {
        self.dims == other.dims
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() <= tol)
    }

    /// Check `U†U = I` within `tol`.
    pub fn is_unitary(&self, tol: f64) -> bool {
        let product = self.dagger().data.dot(&self.data);
        product
            .indexed_iter()
            .all(|((r, c), z)| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (z - Complex64::new(expected, 0.0)).norm() <= tol
            })
    }

    /// Apply the operator to a ket.
    pub fn apply(&self, ket: &Ket) -> LinalgResult<Ket> {
        if self.dim() != ket.dim() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim(),
                got: ket.dim(),
            });
        }
        Ket::new(self.data.dot(ket.data()), ket.dims().to_vec())
    }

    /// `self · rho · self†`.
    pub fn sandwich(&self, rho: &Operator) -> LinalgResult<Operator> {
        let left = self.matmul(rho)?;
        let mut out = left.matmul(&self.dagger())?;
        out.dims = rho.dims.clone();
        Ok(out)
    }

    /// Embed this operator into a larger register.
    ///
    /// Local subsystem `k` of `self` is placed on subsystem `targets[k]` of a
    /// register with subsystem dimensions `full_dims`; the identity acts on
    /// every other subsystem.
    pub fn expand(&self, full_dims: &[usize], targets: &[usize]) -> LinalgResult<Operator> {
        if targets.len() != self.dims.len() {
            return Err(LinalgError::InvalidDims {
                dims: self.dims.clone(),
                size: targets.len(),
            });
        }
        check_subsystems(full_dims.len(), targets)?;
        for (k, &t) in targets.iter().enumerate() {
            if full_dims[t] != self.dims[k] {
                return Err(LinalgError::SubsystemDimMismatch {
                    index: t,
                    expected: full_dims[t],
                    got: self.dims[k],
                });
            }
        }

        let rest: Vec<usize> = (0..full_dims.len())
            .filter(|i| !targets.contains(i))
            .collect();
        let local = subsystem_offsets(full_dims, targets);
        let spectators = subsystem_offsets(full_dims, &rest);

        let n = total_dim(full_dims);
        let mut data = Array2::zeros((n, n));
        for &base in &spectators {
            for (a, &row) in local.iter().enumerate() {
                for (b, &col) in local.iter().enumerate() {
                    data[[base + row, base + col]] = self.data[[a, b]];
                }
            }
        }
        Ok(Self {
            data,
            dims: full_dims.to_vec(),
        })
    }

    /// Reorder subsystems: new subsystem `i` is old subsystem `order[i]`.
    pub fn permute(&self, order: &[usize]) -> LinalgResult<Operator> {
        if order.len() != self.dims.len() {
            return Err(LinalgError::InvalidDims {
                dims: self.dims.clone(),
                size: order.len(),
            });
        }
        check_subsystems(self.dims.len(), order)?;
        let old_index = subsystem_offsets(&self.dims, order);
        let dims: Vec<usize> = order.iter().map(|&o| self.dims[o]).collect();
        let n = self.dim();
        let data = Array2::from_shape_fn((n, n), |(r, c)| {
            self.data[[old_index[r], old_index[c]]]
        });
        Ok(Self { data, dims })
    }

    /// Partial trace keeping the listed subsystems (in ascending order).
    pub fn ptrace(&self, keep: &[usize]) -> LinalgResult<Operator> {
        check_subsystems(self.dims.len(), keep)?;
        let mut keep = keep.to_vec();
        keep.sort_unstable();
        let traced: Vec<usize> = (0..self.dims.len())
            .filter(|i| !keep.contains(i))
            .collect();

        let kept = subsystem_offsets(&self.dims, &keep);
        let summed = subsystem_offsets(&self.dims, &traced);
        let n = kept.len();
        let data = Array2::from_shape_fn((n, n), |(a, b)| {
            summed
                .iter()
                .map(|&t| self.data[[kept[a] + t, kept[b] + t]])
                .sum()
        });
        Ok(Self {
            data,
            dims: keep.iter().map(|&k| self.dims[k]).collect(),
        })
    }
}

impl Mul<&Operator> for &Operator {
    type Output = Operator;

    /// # Panics
    ///
    /// Panics if the operand dimensions differ; use [`Operator::matmul`] for
    /// a fallible product.
    fn mul(self, rhs: &Operator) -> Operator {
        assert_eq!(
            self.dim(),
            rhs.dim(),
            "operator dimensions differ: {} vs {}",
            self.dim(),
            rhs.dim()
        );
        Operator {
            data: self.data.dot(&rhs.data),
            dims: self.dims.clone(),
        }
    }
}

impl Mul for Operator {
    type Output = Operator;

    fn mul(self, rhs: Operator) -> Operator {
        &self * &rhs
    }
}

impl Mul<Complex64> for &Operator {
    type Output = Operator;

    fn mul(self, rhs: Complex64) -> Operator {
        self.scale(rhs)
    }
}

impl Add<&Operator> for &Operator {
    type Output = Operator;

    fn add(self, rhs: &Operator) -> Operator {
        Operator {
            data: &self.data + &rhs.data,
            dims: self.dims.clone(),
        }
    }
}

impl Sub<&Operator> for &Operator {
    type Output = Operator;

    fn sub(self, rhs: &Operator) -> Operator {
        Operator {
            data: &self.data - &rhs.data,
            dims: self.dims.clone(),
        }
    }
}
