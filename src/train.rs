//! Top-level orchestration: dispatch to a solver, score the result, and
//! optionally write out per-exemplar predictions.

use std::io::{self, Write};

use rand::RngCore;

use crate::diagnostics;
use crate::smo::platt::PlattConfig;
use crate::smo::fan::FanConfig;
use crate::smo::{ExitReason, GramKernelSource, KernelSource, TrainResult};
use crate::svm::Svm;

/// Which SMO driver to run.
pub enum Algorithm<'a> {
    /// Platt (1998), using a single shared penalty (ignores per-class
    /// penalties; pass the same value to both sides of
    /// [`Svm::new`](crate::svm::Svm::new) if you intend to use this).
    Platt {
        /// Shared penalty C.
        c: f64,
        /// Termination/tolerance knobs.
        config: PlattConfig,
        /// Drives random partner selection.
        rng: &'a mut dyn RngCore,
    },
    /// Fan, Chen & Lin (2005), honoring per-class penalties directly.
    Fan {
        /// Termination knobs.
        config: FanConfig,
    },
}

/// Train `svm` in place with the chosen algorithm, then compute diagnostics
/// against both the training and test splits.
pub fn train(svm: &mut Svm, kernel: &dyn KernelSource, algorithm: Algorithm<'_>) -> TrainResult {
    log::info!(
        "training SVM: {} training, {} test exemplars",
        svm.training_count(),
        svm.test_count()
    );

    let result = match algorithm {
        Algorithm::Platt { c, config, rng } => crate::smo::platt::train(svm, kernel, c, config, rng),
        Algorithm::Fan { config } => crate::smo::fan::train(svm, kernel, config),
    };

    let diag = diagnostics::evaluate(svm, kernel);
    log::info!(
        "train_err: {}/{} test_err: {}/{} ({:?} after {} iterations)",
        diag.training_err_count,
        svm.training_count(),
        diag.test_err_count,
        svm.test_count(),
        result.exit_reason,
        result.iterations
    );
    svm.set_diagnostics(diag);

    if result.exit_reason == ExitReason::IterationCap {
        log::warn!("SMO driver hit its iteration cap before converging");
    }

    result
}

/// Convenience wrapper around [`train`] that builds the
/// [`crate::smo::GramKernelSource`] for callers who only have a precomputed
/// Gram matrix.
pub fn train_with_gram(svm: &mut Svm, gram: &crate::gram::GramMatrix, algorithm: Algorithm<'_>) -> TrainResult {
    let source = GramKernelSource::new(gram);
    train(svm, &source, algorithm)
}

/// Predict the raw decision value for exemplar `i` (training or test).
pub fn predict(svm: &Svm, kernel: &dyn KernelSource, i: usize) -> f64 {
    crate::svm::predict(svm, kernel, i)
}

/// Write one `prediction\tlabel` line per training+test exemplar, matching
/// the tab-separated scientific-notation format the original CLI wrote to
/// its `-o` output file.
pub fn write_predictions<W: Write>(
    mut out: W,
    svm: &Svm,
    kernel: &dyn KernelSource,
) -> io::Result<()> {
    let n = svm.training_count() + svm.test_count();
    for i in 0..n {
        let prediction = svm.decision_value(kernel, i);
        writeln!(out, "{:e}\t{:e}", prediction, svm.label(i))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gram::GramMatrix;
    use crate::kernel::KernelFunction;
    use crate::vector::{Feature, SparseVector};
    use rand::SeedableRng;

    fn toy() -> (Vec<SparseVector>, Vec<f64>) {
        let vectors = vec![
            SparseVector::with_label(vec![Feature::new(1, 5.0)], 1.0).unwrap(),
            SparseVector::with_label(vec![Feature::new(1, 4.0)], 1.0).unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -5.0)], -1.0).unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -4.0)], -1.0).unwrap(),
        ];
        let labels = vectors.iter().map(|v| v.label()).collect();
        (vectors, labels)
    }

    #[test]
    fn platt_dispatch_populates_diagnostics() {
        let (vectors, labels) = toy();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(42);

        let algorithm = Algorithm::Platt {
            c: 10.0,
            config: PlattConfig::default(),
            rng: &mut rng,
        };
        train_with_gram(&mut svm, &gram, algorithm);

        assert_eq!(svm.diagnostics().training_err_count, 0);
    }

    #[test]
    fn fan_dispatch_populates_diagnostics() {
        let (vectors, labels) = toy();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();

        let algorithm = Algorithm::Fan {
            config: FanConfig::default(),
        };
        train_with_gram(&mut svm, &gram, algorithm);

        assert_eq!(svm.diagnostics().training_err_count, 0);
    }

    #[test]
    fn write_predictions_emits_one_line_per_exemplar() {
        let (vectors, labels) = toy();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let algorithm = Algorithm::Fan {
            config: FanConfig::default(),
        };
        train_with_gram(&mut svm, &gram, algorithm);

        let source = GramKernelSource::new(&gram);
        let mut buf = Vec::new();
        write_predictions(&mut buf, &svm, &source).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 4);
        for line in text.lines() {
            assert_eq!(line.split('\t').count(), 2);
        }
    }
}
