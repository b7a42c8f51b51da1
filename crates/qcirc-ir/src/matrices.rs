//! Local matrices of the standard gates.
//!
//! Every function returns the gate's operator on its own qubits, ordered
//! `controls ++ targets` with the first qubit most significant.

use num_complex::Complex64;
use qcirc_linalg::Operator;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, FRAC_PI_8, PI};

use crate::error::IrResult;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

fn qubits(n: usize, entries: Vec<Complex64>) -> IrResult<Operator> {
    Ok(Operator::from_vec(vec![2; n], entries)?)
}

/// Pauli X.
pub fn x() -> IrResult<Operator> {
    qubits(1, vec![ZERO, ONE, ONE, ZERO])
}

/// Pauli Y.
pub fn y() -> IrResult<Operator> {
    qubits(1, vec![ZERO, -I, I, ZERO])
}

/// Pauli Z.
pub fn z() -> IrResult<Operator> {
    qubits(1, vec![ONE, ZERO, ZERO, -ONE])
}

/// `diag(1, i)`.
pub fn s() -> IrResult<Operator> {
    phasegate(PI / 2.0)
}

/// `diag(1, e^{iπ/4})`.
pub fn t() -> IrResult<Operator> {
    phasegate(FRAC_PI_4)
}

/// Hadamard.
pub fn snot() -> IrResult<Operator> {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    qubits(1, vec![h, h, h, -h])
}

/// Square root of X.
pub fn sqrtnot() -> IrResult<Operator> {
    let a = Complex64::new(0.5, 0.5);
    let b = Complex64::new(0.5, -0.5);
    qubits(1, vec![a, b, b, a])
}

/// Rotation about X by `theta`.
pub fn rx(theta: f64) -> IrResult<Operator> {
    let (sin, cos) = (theta / 2.0).sin_cos();
    let c = Complex64::new(cos, 0.0);
    let s = Complex64::new(0.0, -sin);
    qubits(1, vec![c, s, s, c])
}

/// Rotation about Y by `theta`.
pub fn ry(theta: f64) -> IrResult<Operator> {
    let (sin, cos) = (theta / 2.0).sin_cos();
    let c = Complex64::new(cos, 0.0);
    let s = Complex64::new(sin, 0.0);
    qubits(1, vec![c, -s, s, c])
}

/// Rotation about Z by `theta`: `diag(e^{-iθ/2}, e^{iθ/2})`.
pub fn rz(theta: f64) -> IrResult<Operator> {
    qubits(
        1,
        vec![
            Complex64::from_polar(1.0, -theta / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, theta / 2.0),
        ],
    )
}

/// `diag(1, e^{iθ})`.
pub fn phasegate(theta: f64) -> IrResult<Operator> {
    qubits(1, vec![ONE, ZERO, ZERO, Complex64::from_polar(1.0, theta)])
}

/// `RZ(φ)·RY(θ)·RZ(λ)`.
pub fn qasmu(theta: f64, phi: f64, lambda: f64) -> IrResult<Operator> {
    Ok(rz(phi)?.matmul(&ry(theta)?)?.matmul(&rz(lambda)?)?)
}

/// `e^{iθ}` times the identity on `dims`.
pub fn globalphase(theta: f64, dims: &[usize]) -> Operator {
    Operator::identity(dims).scale(Complex64::from_polar(1.0, theta))
}

/// Block-diagonal `|0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ U` with the control leading.
pub fn controlled(u: &Operator) -> IrResult<Operator> {
    let off = Operator::fock_dm(2, 0)?.tensor(&Operator::identity(u.dims()));
    let on = Operator::fock_dm(2, 1)?.tensor(u);
    Ok(&off + &on)
}

/// Controlled X.
pub fn cnot() -> IrResult<Operator> {
    controlled(&x()?)
}

/// Controlled Z; also the `CSIGN` gate.
pub fn cz() -> IrResult<Operator> {
    controlled(&z()?)
}

/// Controlled Y.
pub fn cy() -> IrResult<Operator> {
    controlled(&y()?)
}

/// Controlled S.
pub fn cs() -> IrResult<Operator> {
    controlled(&s()?)
}

/// Controlled T.
pub fn ct() -> IrResult<Operator> {
    controlled(&t()?)
}

/// Exchange of two qubits.
pub fn swap() -> IrResult<Operator> {
    qubits(
        2,
        vec![
            ONE, ZERO, ZERO, ZERO, //
            ZERO, ZERO, ONE, ZERO, //
            ZERO, ONE, ZERO, ZERO, //
            ZERO, ZERO, ZERO, ONE,
        ],
    )
}

/// SWAP with an `i` phase on the exchanged states.
pub fn iswap() -> IrResult<Operator> {
    qubits(
        2,
        vec![
            ONE, ZERO, ZERO, ZERO, //
            ZERO, ZERO, I, ZERO, //
            ZERO, I, ZERO, ZERO, //
            ZERO, ZERO, ZERO, ONE,
        ],
    )
}

/// Square root of SWAP.
pub fn sqrtswap() -> IrResult<Operator> {
    let a = Complex64::new(0.5, 0.5);
    let b = Complex64::new(0.5, -0.5);
    qubits(
        2,
        vec![
            ONE, ZERO, ZERO, ZERO, //
            ZERO, a, b, ZERO, //
            ZERO, b, a, ZERO, //
            ZERO, ZERO, ZERO, ONE,
        ],
    )
}

/// Square root of iSWAP.
pub fn sqrtiswap() -> IrResult<Operator> {
    let a = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let b = Complex64::new(0.0, FRAC_1_SQRT_2);
    qubits(
        2,
        vec![
            ONE, ZERO, ZERO, ZERO, //
            ZERO, a, b, ZERO, //
            ZERO, b, a, ZERO, //
            ZERO, ZERO, ZERO, ONE,
        ],
    )
}

/// The Berkeley B gate.
pub fn berkeley() -> IrResult<Operator> {
    let c1 = Complex64::new(FRAC_PI_8.cos(), 0.0);
    let s1 = Complex64::new(0.0, FRAC_PI_8.sin());
    let c3 = Complex64::new((3.0 * FRAC_PI_8).cos(), 0.0);
    let s3 = Complex64::new(0.0, (3.0 * FRAC_PI_8).sin());
    qubits(
        2,
        vec![
            c1, ZERO, ZERO, s1, //
            ZERO, c3, s3, ZERO, //
            ZERO, s3, c3, ZERO, //
            s1, ZERO, ZERO, c1,
        ],
    )
}

/// The SWAP^α gate.
pub fn swapalpha(alpha: f64) -> IrResult<Operator> {
    let phase = Complex64::from_polar(1.0, PI * alpha);
    let a = (ONE + phase) * 0.5;
    let b = (ONE - phase) * 0.5;
    qubits(
        2,
        vec![
            ONE, ZERO, ZERO, ZERO, //
            ZERO, a, b, ZERO, //
            ZERO, b, a, ZERO, //
            ZERO, ZERO, ZERO, ONE,
        ],
    )
}

/// Doubly controlled X.
pub fn toffoli() -> IrResult<Operator> {
    controlled(&cnot()?)
}

/// Controlled SWAP.
pub fn fredkin() -> IrResult<Operator> {
    controlled(&swap()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_gates_are_unitary() {
        let gates = [
            x(),
            y(),
            z(),
            s(),
            t(),
            snot(),
            sqrtnot(),
            rx(0.3),
            ry(-1.1),
            rz(2.4),
            phasegate(0.7),
            qasmu(0.1, 0.2, 0.3),
            cnot(),
            cz(),
            cy(),
            cs(),
            ct(),
            swap(),
            iswap(),
            sqrtswap(),
            sqrtiswap(),
            berkeley(),
            swapalpha(0.3),
            toffoli(),
            fredkin(),
        ];
        for gate in gates {
            assert!(gate.unwrap().is_unitary(1e-12));
        }
    }

    #[test]
    fn test_square_roots() {
        let sqrtnot = sqrtnot().unwrap();
        assert!((&sqrtnot * &sqrtnot).approx_eq(&x().unwrap(), 1e-12));

        let sqrtswap = sqrtswap().unwrap();
        assert!((&sqrtswap * &sqrtswap).approx_eq(&swap().unwrap(), 1e-12));

        let sqrtiswap = sqrtiswap().unwrap();
        assert!((&sqrtiswap * &sqrtiswap).approx_eq(&iswap().unwrap(), 1e-12));

        assert!(swapalpha(1.0).unwrap().approx_eq(&swap().unwrap(), 1e-12));
    }

    #[test]
    fn test_cnot_flips_target_when_control_set() {
        let cnot = cnot().unwrap();
        // |10⟩ → |11⟩
        assert_eq!(cnot.get(3, 2), ONE);
        assert_eq!(cnot.get(0, 0), ONE);
    }

    #[test]
    fn test_toffoli_layout() {
        let toffoli = toffoli().unwrap();
        assert_eq!(toffoli.dims(), &[2, 2, 2]);
        assert_eq!(toffoli.get(7, 6), ONE);
        assert_eq!(toffoli.get(5, 5), ONE);
    }

    #[test]
    fn test_globalphase_scales_identity() {
        let gp = globalphase(PI / 2.0, &[2, 2]);
        assert!(gp.approx_eq(&Operator::identity(&[2, 2]).scale(I), 1e-15));
    }
}
