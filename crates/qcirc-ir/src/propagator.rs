//! Composition of gate propagators.

use qcirc_linalg::{LinalgError, Operator};

use crate::error::{IrError, IrResult};

/// How a slice of propagators is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrder {
    /// The slice is in application order; the result is `U_n ⋯ U_1`.
    #[default]
    LeftToRight,
    /// The slice is in operator-composition order; the result is `U_1 ⋯ U_n`.
    RightToLeft,
}

/// Multiply full-register propagators into one unitary.
pub fn gate_sequence_product(ops: &[Operator], order: ProductOrder) -> IrResult<Operator> {
    let (first, rest) = ops.split_first().ok_or(IrError::EmptySequence)?;
    let mut product = first.clone();
    for op in rest {
        product = match order {
            ProductOrder::LeftToRight => op.matmul(&product)?,
            ProductOrder::RightToLeft => product.matmul(op)?,
        };
    }
    Ok(product)
}

/// A partial product acting on a set of qubits, in the order listed.
struct Block {
    op: Operator,
    qubits: Vec<usize>,
}

/// Multiply local propagators in application order without expanding each
/// one to the whole register.
///
/// `qubits[i]` lists the register indices `ops[i]` acts on. Propagators with
/// overlapping footprints are merged; disjoint blocks stay separate until the
/// end. Returns the product on the sorted union of all touched qubits
/// together with that index list.
///
/// Each footprint must name exactly one qubit per subsystem of its
/// propagator.
pub fn gate_sequence_product_lazy(
    ops: &[Operator],
    qubits: &[Vec<usize>],
) -> IrResult<(Operator, Vec<usize>)> {
    if ops.is_empty() {
        return Err(IrError::EmptySequence);
    }
    if ops.len() != qubits.len() {
        return Err(IrError::IndexOutOfRange {
            index: qubits.len(),
            len: ops.len(),
        });
    }

    for (op, footprint) in ops.iter().zip(qubits) {
        if footprint.len() != op.dims().len() {
            return Err(LinalgError::InvalidDims {
                dims: op.dims().to_vec(),
                size: footprint.len(),
            }
            .into());
        }
    }

    let mut blocks: Vec<Block> = vec![];
    for (op, footprint) in ops.iter().zip(qubits) {
        let (touching, mut others): (Vec<Block>, Vec<Block>) = blocks
            .into_iter()
            .partition(|b| b.qubits.iter().any(|q| footprint.contains(q)));

        let mut merged_qubits: Vec<usize> = vec![];
        let mut merged_dims: Vec<usize> = vec![];
        let mut merged = Operator::tensor_all(touching.iter().map(|b| &b.op));
        for block in &touching {
            merged_qubits.extend_from_slice(&block.qubits);
            merged_dims.extend_from_slice(block.op.dims());
        }
        for (k, &q) in footprint.iter().enumerate() {
            if !merged_qubits.contains(&q) {
                let dim = op.dims()[k];
                merged = merged.tensor(&Operator::identity(&[dim]));
                merged_qubits.push(q);
                merged_dims.push(dim);
            }
        }

        let positions: Vec<usize> = footprint
            .iter()
            .filter_map(|q| merged_qubits.iter().position(|m| m == q))
            .collect();
        let embedded = op.expand(&merged_dims, &positions)?;
        others.push(Block {
            op: embedded.matmul(&merged)?,
            qubits: merged_qubits,
        });
        blocks = others;
    }

    let mut all_qubits: Vec<usize> = vec![];
    for block in &blocks {
        all_qubits.extend_from_slice(&block.qubits);
    }
    let product = Operator::tensor_all(blocks.iter().map(|b| &b.op));

    let mut sorted = all_qubits.clone();
    sorted.sort_unstable();
    let order: Vec<usize> = sorted
        .iter()
        .filter_map(|q| all_qubits.iter().position(|a| a == q))
        .collect();
    Ok((product.permute(&order)?, sorted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrices;

    #[test]
    fn test_order_conventions() {
        let x = matrices::x().unwrap();
        let s = matrices::s().unwrap();
        let ltr = gate_sequence_product(&[x.clone(), s.clone()], ProductOrder::LeftToRight).unwrap();
        assert!(ltr.approx_eq(&(&s * &x), 1e-15));
        let rtl = gate_sequence_product(&[x.clone(), s.clone()], ProductOrder::RightToLeft).unwrap();
        assert!(rtl.approx_eq(&(&x * &s), 1e-15));
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(
            gate_sequence_product(&[], ProductOrder::LeftToRight).unwrap_err(),
            IrError::EmptySequence
        );
        assert_eq!(
            gate_sequence_product_lazy(&[], &[]).unwrap_err(),
            IrError::EmptySequence
        );
    }

    #[test]
    fn test_lazy_keeps_disjoint_blocks() {
        let x = matrices::x().unwrap();
        let z = matrices::z().unwrap();
        let (u, qubits) =
            gate_sequence_product_lazy(&[x.clone(), z.clone()], &[vec![3], vec![1]]).unwrap();
        assert_eq!(qubits, vec![1, 3]);
        assert!(u.approx_eq(&z.tensor(&x), 1e-15));
    }

    #[test]
    fn test_lazy_merges_overlapping_blocks() {
        let h = matrices::snot().unwrap();
        let cnot = matrices::cnot().unwrap();
        let (u, qubits) =
            gate_sequence_product_lazy(&[h.clone(), cnot.clone()], &[vec![2], vec![2, 0]])
                .unwrap();
        assert_eq!(qubits, vec![0, 2]);

        let eager = gate_sequence_product(
            &[
                h.expand(&[2, 2], &[1]).unwrap(),
                cnot.expand(&[2, 2], &[1, 0]).unwrap(),
            ],
            ProductOrder::LeftToRight,
        )
        .unwrap();
        assert!(u.distance(&eager) < 1e-12);
    }

    #[test]
    fn test_lazy_rejects_mismatched_footprint() {
        let x = matrices::x().unwrap();
        assert!(matches!(
            gate_sequence_product_lazy(&[x.clone()], &[vec![0, 1]]).unwrap_err(),
            IrError::Linalg(LinalgError::InvalidDims { size: 2, .. })
        ));
        assert!(matches!(
            gate_sequence_product_lazy(&[x.clone(), x.clone()], &[vec![0], vec![]]).unwrap_err(),
            IrError::Linalg(LinalgError::InvalidDims { size: 0, .. })
        ));
        assert_eq!(
            gate_sequence_product_lazy(&[x], &[vec![0], vec![1]]).unwrap_err(),
            IrError::IndexOutOfRange { index: 2, len: 1 }
        );
    }
}
