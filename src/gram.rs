//! Dense symmetric Gram matrix precomputation.

use crate::kernel::Kernel;
use crate::vector::SparseVector;

/// A dense, symmetric N×N matrix of pairwise kernel evaluations.
///
/// Built once from a kernel and a slice of [`SparseVector`]s, then read-only
/// for the lifetime of training. This is the only [`crate::smo::KernelSource`]
/// implementation this crate ships, in keeping with the Non-goal of not
/// supporting an on-the-fly/cached kernel evaluation.
#[derive(Debug, Clone)]
pub struct GramMatrix {
    n: usize,
    data: Vec<f64>,
}

impl GramMatrix {
    /// Compute the Gram matrix for `vectors` under `kernel`.
    ///
    /// Fills the lower triangle and diagonal with direct kernel calls and
    /// mirrors into the upper triangle, so each pair is evaluated exactly
    /// once. O(N²) kernel evaluations.
    pub fn compute<K: Kernel>(vectors: &[SparseVector], kernel: &K) -> GramMatrix {
        let n = vectors.len();
        log::debug!("computing {0}x{0} gram matrix", n);
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..i {
                let v = kernel.apply(&vectors[i], &vectors[j]);
                data[i * n + j] = v;
                data[j * n + i] = v;
            }
            data[i * n + i] = kernel.apply(&vectors[i], &vectors[i]);
        }
        log::debug!("gram matrix complete");
        GramMatrix { n, data }
    }

    /// The number of rows/columns.
    pub fn n(&self) -> usize {
        self.n
    }

    /// K(i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{KernelFunction, KernelParams};
    use crate::vector::Feature;

    fn vectors() -> Vec<SparseVector> {
        vec![
            SparseVector::with_label(vec![Feature::new(1, 1.0), Feature::new(2, 1.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, 2.0), Feature::new(2, 2.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -1.0), Feature::new(2, -1.0)], -1.0)
                .unwrap(),
        ]
    }

    #[test]
    fn gram_matrix_is_symmetric() {
        let v = vectors();
        for kernel in [
            KernelFunction::Linear,
            KernelFunction::Polynomial(KernelParams::default()),
            KernelFunction::Rbf(KernelParams::default()),
            KernelFunction::Sigmoid(KernelParams::default()),
        ] {
            let g = GramMatrix::compute(&v, &kernel);
            for i in 0..g.n() {
                for j in 0..g.n() {
                    assert_eq!(g.get(i, j), g.get(j, i));
                }
            }
        }
    }

    #[test]
    fn gram_matrix_matches_direct_kernel_calls() {
        let v = vectors();
        let kernel = KernelFunction::Linear;
        let g = GramMatrix::compute(&v, &kernel);
        for i in 0..v.len() {
            for j in 0..v.len() {
                assert_eq!(g.get(i, j), kernel.apply(&v[i], &v[j]));
            }
        }
    }

    #[test]
    fn linear_diagonal_is_nonnegative() {
        let v = vectors();
        let g = GramMatrix::compute(&v, &KernelFunction::Linear);
        for i in 0..g.n() {
            assert!(g.get(i, i) >= 0.0);
        }
    }
}
