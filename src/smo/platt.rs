//! The original Platt (1998) SMO driver: examine-all / unbound-only outer
//! loop, an error cache E[i], and three-tier partner selection.

use rand::RngCore;

use crate::smo::{ExitReason, KernelSource, TrainResult, EPS};
use crate::svm::{Cache, Svm};

/// Knobs that control the Platt driver's termination and KKT tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlattConfig {
    /// KKT-violation tolerance used to decide whether an example needs
    /// examining. Distinct from [`crate::smo::EPS`], which governs the
    /// no-progress check inside a step, even though both default to 1e-3.
    pub tolerance: f64,
    /// Outer-loop iteration cap. `None` means unbounded (matches the
    /// reference behavior of treating `max_iter < 1` as "no cap").
    pub max_iter: Option<usize>,
}

impl Default for PlattConfig {
    fn default() -> Self {
        PlattConfig {
            tolerance: 1e-3,
            max_iter: None,
        }
    }
}

/// Train `svm` in place using Platt's SMO with a single shared penalty `c`.
///
/// Platt's original driver optimizes against one global `C`, not per-class
/// penalties; pass `svm.penalties()` through if the two classes share a
/// penalty, otherwise call [`crate::svm::Svm::with_single_penalty`] at
/// construction time so the two coincide.
///
/// `rng` drives the second and third partner-selection phases, started from
/// a random rotation offset each call. Callers supply the source so a run
/// is reproducible given a fixed seed.
pub fn train(
    svm: &mut Svm,
    kernel: &dyn KernelSource,
    c: f64,
    config: PlattConfig,
    rng: &mut dyn RngCore,
) -> TrainResult {
    let n = svm.training_count();
    let mut error_cache = vec![0.0; n];
    let max_iter = config.max_iter.unwrap_or(usize::MAX);

    let mut examine_all = true;
    let mut iter = 0usize;
    let mut num_changed;
    let exit_reason;

    loop {
        num_changed = 0;
        if examine_all {
            for k in 0..n {
                if examine(svm, kernel, c, config.tolerance, &mut error_cache, k, rng) {
                    num_changed += 1;
                }
            }
            examine_all = false;
        } else {
            for k in 0..n {
                let ak = svm.alpha(k);
                if ak != 0.0 && ak != c {
                    if examine(svm, kernel, c, config.tolerance, &mut error_cache, k, rng) {
                        num_changed += 1;
                    }
                }
            }
            if num_changed == 0 {
                examine_all = true;
            }
        }

        if iter % 100.min(n.max(1)) == 0 {
            log::debug!("platt: iter={} num_changed={}", iter, num_changed);
        }

        iter += 1;

        if !(num_changed > 0 || examine_all) {
            exit_reason = ExitReason::Converged;
            break;
        }
        if iter >= max_iter {
            exit_reason = ExitReason::IterationCap;
            break;
        }
    }

    log::debug!(
        "platt: training done after {} iterations ({:?})",
        iter,
        exit_reason
    );
    svm.set_cache(Cache::Error(error_cache));

    TrainResult {
        iterations: iter,
        exit_reason,
    }
}

fn current_error(svm: &Svm, kernel: &dyn KernelSource, error_cache: &[f64], c: f64, i: usize) -> f64 {
    let a = svm.alpha(i);
    if a > 0.0 && a < c {
        error_cache[i]
    } else {
        svm.decision_value(kernel, i) - svm.label(i)
    }
}

fn examine(
    svm: &mut Svm,
    kernel: &dyn KernelSource,
    c: f64,
    tolerance: f64,
    error_cache: &mut [f64],
    i1: usize,
    rng: &mut dyn RngCore,
) -> bool {
    let n = svm.training_count();
    let y1 = svm.label(i1);
    let alph1 = svm.alpha(i1);
    let e1 = current_error(svm, kernel, error_cache, c, i1);
    let r1 = y1 * e1;

    if !((r1 < -tolerance && alph1 < c) || (r1 > tolerance && alph1 > 0.0)) {
        return false;
    }

    // 1) the unbound example with maximum |E1 - E2|
    let mut best: Option<usize> = None;
    let mut tmax = 0.0;
    for k in 0..n {
        let ak = svm.alpha(k);
        if ak > 0.0 && ak < c {
            let e2 = error_cache[k];
            let delta = (e1 - e2).abs();
            if delta > tmax {
                tmax = delta;
                best = Some(k);
            }
        }
    }
    if let Some(i2) = best {
        if take_step(svm, kernel, c, error_cache, i1, i2) {
            return true;
        }
    }

    // 2) any other unbound example, starting from a random offset
    let k0 = (rng.next_u32() as usize) % n.max(1);
    for step in 0..n {
        let i2 = (k0 + step) % n;
        let a2 = svm.alpha(i2);
        if a2 > 0.0 && a2 < c {
            if take_step(svm, kernel, c, error_cache, i1, i2) {
                return true;
            }
        }
    }

    // 3) any other example at all, starting from a random offset
    let k0 = (rng.next_u32() as usize) % n.max(1);
    for step in 0..n {
        let i2 = (k0 + step) % n;
        if take_step(svm, kernel, c, error_cache, i1, i2) {
            return true;
        }
    }

    false
}

fn take_step(
    svm: &mut Svm,
    kernel: &dyn KernelSource,
    c: f64,
    error_cache: &mut [f64],
    i1: usize,
    i2: usize,
) -> bool {
    if i1 == i2 {
        return false;
    }

    let y1 = svm.label(i1);
    let y2 = svm.label(i2);
    let alph1 = svm.alpha(i1);
    let alph2 = svm.alpha(i2);
    let e1 = current_error(svm, kernel, error_cache, c, i1);
    let e2 = current_error(svm, kernel, error_cache, c, i2);
    let s = y1 * y2;

    let (l, h) = if y1 == y2 {
        let gamma = alph1 + alph2;
        if gamma > c {
            (gamma - c, c)
        } else {
            (0.0, gamma)
        }
    } else {
        let gamma = alph1 - alph2;
        if gamma > 0.0 {
            (0.0, c - gamma)
        } else {
            (-gamma, c)
        }
    };
    if l == h {
        return false;
    }

    let k11 = kernel.k(i1, i1);
    let k12 = kernel.k(i1, i2);
    let k22 = kernel.k(i2, i2);
    let eta = 2.0 * k12 - k11 - k22;

    let mut a2 = if eta < 0.0 {
        let mut a2 = alph2 + y2 * (e2 - e1) / eta;
        if a2 < l {
            a2 = l;
        } else if a2 > h {
            a2 = h;
        }
        a2
    } else {
        let c1 = eta / 2.0;
        let c2 = y2 * (e1 - e2) - eta * alph2;
        let lobj = c1 * l * l + c2 * l;
        let hobj = c1 * h * h + c2 * h;
        if lobj > hobj + EPS {
            l
        } else if lobj < hobj - EPS {
            h
        } else {
            alph2
        }
    };

    if (a2 - alph2).abs() < EPS * (a2 + alph2 + EPS) {
        return false;
    }

    let mut a1 = alph1 - s * (a2 - alph2);
    if a1 < 0.0 {
        a2 += s * a1;
        a1 = 0.0;
    } else if a1 > c {
        let t = a1 - c;
        a2 += s * t;
        a1 = c;
    }

    debug_assert!(a1 >= 0.0 && a1 <= c);
    debug_assert!(a2 >= 0.0 && a2 <= c);
    debug_assert!((y1 * a1 + y2 * a2 - (y1 * alph1 + y2 * alph2)).abs() < 1e-6);

    let old_b = svm.bias();
    let b1 = old_b + e1 + y1 * (a1 - alph1) * k11 + y2 * (a2 - alph2) * k12;
    let b2 = old_b + e2 + y1 * (a1 - alph1) * k12 + y2 * (a2 - alph2) * k22;
    let bnew = if a1 > 0.0 && a1 < c {
        b1
    } else if a2 > 0.0 && a2 < c {
        b2
    } else {
        (b1 + b2) / 2.0
    };
    let delta_b = bnew - old_b;
    svm.set_bias(bnew);

    let n = svm.training_count();
    let t1 = y1 * (a1 - alph1);
    let t2 = y2 * (a2 - alph2);
    for i in 0..n {
        let ai = svm.alpha(i);
        if ai > 0.0 && ai < c {
            error_cache[i] += t1 * kernel.k(i1, i) + t2 * kernel.k(i2, i) - delta_b;
        }
    }
    error_cache[i1] = 0.0;
    error_cache[i2] = 0.0;

    svm.alphas_mut()[i1] = a1;
    svm.alphas_mut()[i2] = a2;

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gram::GramMatrix;
    use crate::kernel::KernelFunction;
    use crate::smo::GramKernelSource;
    use crate::vector::{Feature, SparseVector};
    use rand::SeedableRng;

    fn toy_vectors() -> Vec<SparseVector> {
        vec![
            SparseVector::with_label(vec![Feature::new(1, 2.0), Feature::new(2, 2.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, 3.0), Feature::new(2, 3.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -2.0), Feature::new(2, -2.0)], -1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -3.0), Feature::new(2, -3.0)], -1.0)
                .unwrap(),
        ]
    }

    #[test]
    fn converges_on_a_linearly_separable_toy_set() {
        let vectors = toy_vectors();
        let labels: Vec<f64> = vectors.iter().map(|v| v.label()).collect();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let source = GramKernelSource::new(&gram);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);

        let result = train(&mut svm, &source, 10.0, PlattConfig::default(), &mut rng);
        assert_eq!(result.exit_reason, ExitReason::Converged);

        for i in 0..4 {
            let f = svm.decision_value(&source, i);
            assert_eq!(f.signum(), svm.label(i).signum());
        }
    }

    #[test]
    fn iteration_cap_is_honored() {
        let vectors = toy_vectors();
        let labels: Vec<f64> = vectors.iter().map(|v| v.label()).collect();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let source = GramKernelSource::new(&gram);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);

        let config = PlattConfig {
            tolerance: 1e-3,
            max_iter: Some(1),
        };
        let result = train(&mut svm, &source, 10.0, config, &mut rng);
        assert!(result.iterations <= 2);
    }

    #[test]
    fn take_step_rejects_identical_indices() {
        let vectors = toy_vectors();
        let labels: Vec<f64> = vectors.iter().map(|v| v.label()).collect();
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
        let source = GramKernelSource::new(&gram);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let mut cache = vec![0.0; 4];
        assert!(!take_step(&mut svm, &source, 10.0, &mut cache, 2, 2));
    }

    /// A hand-crafted kernel source whose (i, j) entries are just indexed
    /// directly, used to force a specific curvature without going through
    /// `GramMatrix`.
    struct MockKernelSource {
        matrix: Vec<Vec<f64>>,
    }

    impl KernelSource for MockKernelSource {
        fn k(&self, i: usize, j: usize) -> f64 {
            self.matrix[i][j]
        }
    }

    #[test]
    fn take_step_handles_nonpositive_curvature_via_objective_tiebreak() {
        // k11 + k22 - 2*k12 = 1 + 1 - 4 = -2 <= 0, so eta = 2*k12 - k11 - k22
        // = 2 >= 0: this drives the objective-endpoint tie-break branch
        // instead of the analytic eta < 0 formula.
        let source = MockKernelSource {
            matrix: vec![vec![1.0, 2.0], vec![2.0, 1.0]],
        };
        let labels = vec![1.0, -1.0];
        let mut svm = Svm::with_single_penalty(labels, 2, 0, 5.0).unwrap();
        let mut cache = vec![0.0; 2];

        let changed = take_step(&mut svm, &source, 5.0, &mut cache, 0, 1);
        assert!(changed);
        assert!(svm.alpha(0).is_finite() && (0.0..=5.0).contains(&svm.alpha(0)));
        assert!(svm.alpha(1).is_finite() && (0.0..=5.0).contains(&svm.alpha(1)));
        assert!(svm.bias().is_finite());
    }

    #[test]
    fn indefinite_sigmoid_kernel_still_terminates_with_finite_alphas() {
        // Large, same-sign feature magnitudes push the sigmoid kernel's
        // diagonal and off-diagonal entries all close to tanh's saturation,
        // which makes k11 + k22 - 2*k12 go negative for nearby same-class
        // pairs: the Gram matrix is indefinite, not positive semi-definite.
        let vectors = vec![
            SparseVector::with_label(vec![Feature::new(1, 5.0), Feature::new(2, 5.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, 6.0), Feature::new(2, 6.0)], 1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -5.0), Feature::new(2, -5.0)], -1.0)
                .unwrap(),
            SparseVector::with_label(vec![Feature::new(1, -6.0), Feature::new(2, -6.0)], -1.0)
                .unwrap(),
        ];
        let labels: Vec<f64> = vectors.iter().map(|v| v.label()).collect();
        let params = crate::kernel::KernelParams {
            coef_lin: 0.1,
            coef_const: 0.0,
            poly_degree: 1,
            rbf_gamma: 0.0,
        };
        let gram = GramMatrix::compute(&vectors, &KernelFunction::Sigmoid(params));

        // Confirm the matrix really is indefinite before relying on it: some
        // 2x2 principal minor among same-class points must have a negative
        // curvature a = k11 + k22 - 2*k12.
        let indefinite = (0..4).any(|i| {
            (0..4).any(|j| {
                i != j
                    && gram.get(i, i) + gram.get(j, j) - 2.0 * gram.get(i, j) <= 0.0
            })
        });
        assert!(indefinite, "test fixture must produce an indefinite Gram matrix");

        let source = GramKernelSource::new(&gram);
        let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(11);
        let config = PlattConfig {
            tolerance: 1e-3,
            max_iter: Some(10_000),
        };

        let result = train(&mut svm, &source, 10.0, config, &mut rng);
        assert!(result.iterations <= 10_000);

        for i in 0..4 {
            assert!(svm.alpha(i).is_finite());
        }
        assert!(svm.bias().is_finite());
    }
}
