//! Scoring a trained SVM against its own training and test exemplars.

use crate::smo::KernelSource;
use crate::svm::{ConfusionCounts, Diagnostics, Svm, SupportCounts};

/// Score `svm` against every training and test exemplar, using `svm.label`
/// as ground truth and `sign(predict(..))` as the prediction (0.0 counts as
/// positive).
///
/// Training exemplars are scored `sign(f) == sign(y)`; test exemplars use
/// the equivalent `(f > 0) == (y > 0)` form — the two agree whenever `y` is
/// exactly +1.0 or -1.0, which [`crate::svm::Svm::new`] guarantees.
pub fn evaluate(svm: &Svm, kernel: &dyn KernelSource) -> Diagnostics {
    let train = score_range(svm, kernel, 0, svm.training_count());
    let test = score_range(
        svm,
        kernel,
        svm.training_count(),
        svm.training_count() + svm.test_count(),
    );

    Diagnostics {
        training_err_count: train.errors(),
        test_err_count: test.errors(),
        train,
        test,
        support: support_counts(svm),
    }
}

/// Count, among the training exemplars, how many multipliers landed at
/// zero, at their class penalty, or strictly in between.
pub fn support_counts(svm: &Svm) -> SupportCounts {
    let mut counts = SupportCounts::default();
    for i in 0..svm.training_count() {
        let a = svm.alpha(i);
        if a <= 0.0 {
            counts.non_support += 1;
        } else if a >= svm.penalty(i) {
            counts.bound += 1;
        } else {
            counts.unbound += 1;
        }
    }
    counts
}

fn score_range(svm: &Svm, kernel: &dyn KernelSource, start: usize, end: usize) -> ConfusionCounts {
    let mut counts = ConfusionCounts::default();
    for i in start..end {
        let f = svm.decision_value(kernel, i);
        let predicted_positive = f > 0.0;
        let actual_positive = svm.label(i) > 0.0;
        match (predicted_positive, actual_positive) {
            (true, true) => counts.tp += 1,
            (false, false) => counts.tn += 1,
            (true, false) => counts.fp += 1,
            (false, true) => counts.fn_ += 1,
        }
    }
    counts
}
