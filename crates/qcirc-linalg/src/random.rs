//! Random states and unitaries for tests and benchmarks.

use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

use crate::ket::Ket;
use crate::operator::{Operator, total_dim};

/// Standard complex Gaussian sample via Box-Muller.
fn complex_gaussian<R: Rng + ?Sized>(rng: &mut R) -> Complex64 {
    let u1: f64 = 1.0 - rng.gen_range(0.0..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * std::f64::consts::PI * u2;
    Complex64::new(radius * angle.cos(), radius * angle.sin()) * std::f64::consts::FRAC_1_SQRT_2
}

/// A normalized ket drawn uniformly from the unit sphere.
pub fn rand_ket<R: Rng + ?Sized>(dims: &[usize], rng: &mut R) -> Ket {
    loop {
        let amplitudes = (0..total_dim(dims)).map(|_| complex_gaussian(rng)).collect();
        if let Ok(ket) = Ket::from_vec(dims.to_vec(), amplitudes).and_then(|k| k.normalize()) {
            return ket;
        }
    }
}

/// A Haar-random unitary on the given subsystems.
///
/// Orthonormalizes the columns of a complex Ginibre matrix with modified
/// Gram-Schmidt; the positive diagonal of the implied `R` factor makes the
/// result Haar distributed.
pub fn rand_unitary_haar<R: Rng + ?Sized>(dims: &[usize], rng: &mut R) -> Operator {
    let n = total_dim(dims);
    let mut q: Array2<Complex64> = Array2::from_shape_simple_fn((n, n), || complex_gaussian(rng));

    for j in 0..n {
        for k in 0..j {
            let proj: Complex64 = (0..n).map(|i| q[[i, k]].conj() * q[[i, j]]).sum();
            for i in 0..n {
                let qik = q[[i, k]];
                q[[i, j]] -= proj * qik;
            }
        }
        let norm = (0..n).map(|i| q[[i, j]].norm_sqr()).sum::<f64>().sqrt();
        for i in 0..n {
            q[[i, j]] /= norm;
        }
    }

    Operator::from_parts(q, dims.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_rand_ket_is_normalized() {
        let mut rng = SmallRng::seed_from_u64(7);
        let ket = rand_ket(&[2, 3], &mut rng);
        assert_eq!(ket.dims(), &[2, 3]);
        assert!((ket.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rand_unitary_is_unitary() {
        let mut rng = SmallRng::seed_from_u64(11);
        for dims in [vec![2], vec![2, 2], vec![2, 2, 2]] {
            let u = rand_unitary_haar(&dims, &mut rng);
            assert_eq!(u.dims(), dims.as_slice());
            assert!(u.is_unitary(1e-10));
        }
    }
}
