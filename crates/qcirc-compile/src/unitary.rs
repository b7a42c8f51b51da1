//! 2x2 unitary utilities for single-qubit decomposition.
//!
//! Provides the ZYZ Euler decomposition used to resolve arbitrary
//! single-qubit gates into rotations.

use num_complex::Complex64;
use qcirc_linalg::Operator;

/// Below this magnitude a matrix entry is treated as zero.
const EPSILON: f64 = 1e-12;

/// Euler angles of `U = e^{iα} RZ(β) RY(γ) RZ(δ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZyzAngles {
    /// Global phase α.
    pub alpha: f64,
    /// Last Z rotation β.
    pub beta: f64,
    /// Y rotation γ.
    pub gamma: f64,
    /// First Z rotation δ.
    pub delta: f64,
}

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Read a single-qubit operator; `None` unless its dims are `[2]`.
    pub fn from_operator(op: &Operator) -> Option<Self> {
        if op.dims() != [2] {
            return None;
        }
        Some(Self::new(op.get(0, 0), op.get(0, 1), op.get(1, 0), op.get(1, 1)))
    }

    /// Create an RY rotation matrix.
    pub fn ry(theta: f64) -> Self {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        Self::new(
            Complex64::new(c, 0.0),
            Complex64::new(-s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(c, 0.0),
        )
    }

    /// Create an RZ rotation matrix.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Scale every entry.
    pub fn scale(&self, factor: Complex64) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a * factor, b * factor, c * factor, d * factor)
    }

    /// Determinant.
    pub fn det(&self) -> Complex64 {
        let [a, b, c, d] = self.data;
        a * d - b * c
    }

    /// Largest entrywise difference to `other`.
    pub fn max_diff(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    /// Decompose into `e^{iα} RZ(β) RY(γ) RZ(δ)`.
    ///
    /// Applied in time order this is `RZ(δ)`, `RY(γ)`, `RZ(β)`, then the
    /// phase. When one of the columns degenerates, δ is fixed to zero.
    pub fn zyz(&self) -> ZyzAngles {
        let alpha = self.det().arg() / 2.0;
        let [v00, _, v10, v11] = self.scale(Complex64::from_polar(1.0, -alpha)).data;

        let gamma = 2.0 * v10.norm().atan2(v00.norm());
        let (beta, delta) = if v10.norm() < EPSILON {
            (2.0 * v11.arg(), 0.0)
        } else if v00.norm() < EPSILON {
            (2.0 * v10.arg(), 0.0)
        } else {
            let sum = 2.0 * v11.arg();
            let diff = 2.0 * v10.arg();
            (f64::midpoint(sum, diff), (sum - diff) / 2.0)
        };

        ZyzAngles {
            alpha,
            beta,
            gamma,
            delta,
        }
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}
