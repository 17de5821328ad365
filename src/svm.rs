//! The SVM state container: α, b, labels, penalties, and diagnostics.

use crate::error::Failed;
use crate::smo::KernelSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The per-example cache maintained during training.
///
/// Platt maintains an error cache `E[i] = f(xᵢ) − yᵢ`; Fan maintains a
/// gradient `G[i] = ∂(dual objective)/∂αᵢ`. The two are never both
/// populated — `train` overwrites whichever was there from a previous run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Cache {
    /// No training has run yet.
    Empty,
    /// Platt's error cache.
    Error(Vec<f64>),
    /// Fan's gradient vector.
    Gradient(Vec<f64>),
}

/// Per-split confusion counts produced by [`crate::diagnostics::evaluate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfusionCounts {
    /// True positives.
    pub tp: usize,
    /// True negatives.
    pub tn: usize,
    /// False positives.
    pub fp: usize,
    /// False negatives.
    pub fn_: usize,
}

impl ConfusionCounts {
    /// Total number of misclassifications (fp + fn).
    pub fn errors(&self) -> usize {
        self.fp + self.fn_
    }
}

/// A breakdown of training exemplars by where their multiplier landed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SupportCounts {
    /// α == 0: not a support vector.
    pub non_support: usize,
    /// α == C: a bound support vector (at the penalty, likely misclassified
    /// or inside the margin).
    pub bound: usize,
    /// 0 < α < C: an unbound support vector, exactly on the margin.
    pub unbound: usize,
}

/// Training/test confusion snapshot, plus error counts, produced by
/// [`crate::diagnostics::evaluate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Number of training exemplars classified incorrectly.
    pub training_err_count: usize,
    /// Number of test exemplars classified incorrectly.
    pub test_err_count: usize,
    /// Training confusion counts.
    pub train: ConfusionCounts,
    /// Test confusion counts.
    pub test: ConfusionCounts,
    /// Bound/unbound/non-support breakdown of the training exemplars.
    pub support: SupportCounts,
}

/// The SVM dual-problem state: α, b, labels, per-class penalties, the
/// per-example cache, and diagnostics.
///
/// `N = training_count + test_count` exemplars are tracked in total; the
/// trailing `test_count` never have their α updated, they exist only so
/// [`crate::diagnostics::evaluate`] can score them against the trained
/// model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Svm {
    y: Vec<f64>,
    alpha: Vec<f64>,
    c_pos: f64,
    c_neg: f64,
    b: f64,
    training_count: usize,
    test_count: usize,
    cache: Cache,
    diagnostics: Diagnostics,
}

impl Svm {
    /// Construct a new, untrained SVM state.
    ///
    /// `y` holds the label of every training exemplar followed by the label
    /// of every test exemplar (`y.len() == training_count + test_count`).
    /// `c_pos`/`c_neg` are the per-class penalties; pass the same value
    /// twice for a single shared `C`.
    ///
    /// # Errors
    /// Returns [`FailedKind::InvalidInput`](crate::error::FailedKind::InvalidInput) when:
    /// - `training_count < 2`
    /// - `test_count` doesn't fit (`y.len() != training_count + test_count`)
    /// - any label isn't +1.0/-1.0
    /// - the training split has no positive or no negative example
    /// - `c_pos < 0.0` or `c_neg < 0.0`
    pub fn new(
        y: Vec<f64>,
        training_count: usize,
        test_count: usize,
        c_pos: f64,
        c_neg: f64,
    ) -> Result<Svm, Failed> {
        if training_count < 2 {
            return Err(Failed::invalid_input(format!(
                "not enough training exemplars ({} found)",
                training_count
            )));
        }
        if y.len() != training_count + test_count {
            return Err(Failed::invalid_input(format!(
                "end_support_i mismatch: expected {}, got {} labels",
                training_count + test_count,
                y.len()
            )));
        }
        for (i, &label) in y.iter().enumerate() {
            if label != 1.0 && label != -1.0 {
                return Err(Failed::invalid_input(format!(
                    "bad label for item {} (of {} total): {}",
                    i,
                    y.len(),
                    label
                )));
            }
        }
        let pos = y[..training_count].iter().filter(|&&l| l == 1.0).count();
        if pos == 0 {
            return Err(Failed::invalid_input("no positive training examples found"));
        }
        if pos == training_count {
            return Err(Failed::invalid_input("no negative training examples found"));
        }
        if c_pos < 0.0 || c_neg < 0.0 {
            return Err(Failed::invalid_input(format!(
                "penalty parameters must be non-negative (c_pos={}, c_neg={})",
                c_pos, c_neg
            )));
        }

        let n = y.len();
        Ok(Svm {
            y,
            alpha: vec![0.0; n],
            c_pos,
            c_neg,
            b: 0.0,
            training_count,
            test_count,
            cache: Cache::Empty,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Construct a new SVM state with a single shared penalty `c` (c_pos ==
    /// c_neg == c).
    pub fn with_single_penalty(
        y: Vec<f64>,
        training_count: usize,
        test_count: usize,
        c: f64,
    ) -> Result<Svm, Failed> {
        Svm::new(y, training_count, test_count, c, c)
    }

    /// The per-example penalty Cᵢ for exemplar `i`.
    #[inline]
    pub fn penalty(&self, i: usize) -> f64 {
        if self.y[i] > 0.0 {
            self.c_pos
        } else {
            self.c_neg
        }
    }

    /// Label of exemplar `i`.
    #[inline]
    pub fn label(&self, i: usize) -> f64 {
        self.y[i]
    }

    /// All labels, training followed by test.
    pub fn labels(&self) -> &[f64] {
        &self.y
    }

    /// Current Lagrange multiplier αᵢ.
    #[inline]
    pub fn alpha(&self, i: usize) -> f64 {
        self.alpha[i]
    }

    /// All Lagrange multipliers.
    pub fn alphas(&self) -> &[f64] {
        &self.alpha
    }

    /// Mutable access to the multiplier array, used by the SMO drivers.
    pub(crate) fn alphas_mut(&mut self) -> &mut [f64] {
        &mut self.alpha
    }

    /// Current bias.
    #[inline]
    pub fn bias(&self) -> f64 {
        self.b
    }

    /// Overwrite the bias, used by the SMO drivers.
    pub(crate) fn set_bias(&mut self, b: f64) {
        self.b = b;
    }

    /// Number of training exemplars (their α is optimized).
    #[inline]
    pub fn training_count(&self) -> usize {
        self.training_count
    }

    /// Number of test exemplars (their α stays zero; they're only scored).
    #[inline]
    pub fn test_count(&self) -> usize {
        self.test_count
    }

    /// Total number of tracked exemplars, training + test.
    #[inline]
    pub fn len(&self) -> usize {
        self.training_count + self.test_count
    }

    /// Whether any exemplars are tracked. Always false once successfully
    /// constructed, since `training_count >= 2` is enforced; kept for API
    /// completeness alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `c_pos` and `c_neg`, in that order.
    pub fn penalties(&self) -> (f64, f64) {
        (self.c_pos, self.c_neg)
    }

    /// The current per-example cache (empty until a driver has trained this
    /// state).
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub(crate) fn set_cache(&mut self, cache: Cache) {
        self.cache = cache;
    }

    /// The diagnostics last computed by [`crate::diagnostics::evaluate`].
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
    }

    /// The decision function f(x_k) = Σᵢ αᵢ yᵢ K(i, k) − b, evaluated
    /// against every training exemplar with non-zero α (support vectors).
    pub fn decision_value(&self, kernel: &dyn KernelSource, k: usize) -> f64 {
        let mut s = 0.0;
        for i in 0..self.training_count {
            if self.alpha[i] > 0.0 {
                s += self.alpha[i] * self.y[i] * kernel.k(i, k);
            }
        }
        s - self.b
    }
}

/// Predict the raw decision value for exemplar `i` (training or test).
///
/// Callers wanting a hard ±1 label should classify as positive when the
/// value is strictly greater than 0.0, matching the `> 0.0` convention
/// [`crate::diagnostics::evaluate`] scores against (a decision value of
/// exactly 0.0 counts as negative).
pub fn predict(svm: &Svm, kernel: &dyn KernelSource, i: usize) -> f64 {
    svm.decision_value(kernel, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_few_training_exemplars() {
        let err = Svm::with_single_penalty(vec![1.0], 1, 0, 1.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailedKind::InvalidInput);
    }

    #[test]
    fn rejects_end_support_i_mismatch() {
        let err = Svm::with_single_penalty(vec![1.0, -1.0], 2, 5, 1.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailedKind::InvalidInput);
    }

    #[test]
    fn rejects_bad_label() {
        assert!(Svm::with_single_penalty(vec![1.0, 0.5], 2, 0, 1.0).is_err());
    }

    #[test]
    fn rejects_all_positive_training_set() {
        assert!(Svm::with_single_penalty(vec![1.0, 1.0], 2, 0, 1.0).is_err());
    }

    #[test]
    fn rejects_all_negative_training_set() {
        assert!(Svm::with_single_penalty(vec![-1.0, -1.0], 2, 0, 1.0).is_err());
    }

    #[test]
    fn rejects_negative_penalty() {
        assert!(Svm::new(vec![1.0, -1.0], 2, 0, -1.0, 1.0).is_err());
    }

    #[test]
    fn accepts_valid_construction() {
        let svm = Svm::with_single_penalty(vec![1.0, -1.0, 1.0], 2, 1, 2.0).unwrap();
        assert_eq!(svm.training_count(), 2);
        assert_eq!(svm.test_count(), 1);
        assert_eq!(svm.penalty(0), 2.0);
        assert_eq!(svm.bias(), 0.0);
        assert_eq!(svm.alpha(0), 0.0);
        assert_eq!(*svm.cache(), Cache::Empty);
    }

    #[test]
    fn distinct_class_penalties_are_tracked() {
        let svm = Svm::new(vec![1.0, -1.0], 2, 0, 10.0, 1.0).unwrap();
        assert_eq!(svm.penalty(0), 10.0);
        assert_eq!(svm.penalty(1), 1.0);
    }
}
