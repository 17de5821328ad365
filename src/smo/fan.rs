//! The Fan, Chen & Lin (2005) second-order working-set-selection driver:
//! maintains a gradient vector G instead of an error cache, and selects both
//! multipliers of each step from the I_up/I_low partition in one pass.

use crate::smo::{curvature, renormalize, ExitReason, KernelSource, TrainResult, EPS};
use crate::svm::{Cache, Svm};

/// Knobs that control the Fan driver's termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanConfig {
    /// Outer-loop iteration cap. `None` means unbounded.
    pub max_iter: Option<usize>,
}

impl Default for FanConfig {
    fn default() -> Self {
        FanConfig { max_iter: None }
    }
}

/// Train `svm` in place using the Fan/Chen/Lin working-set-selection
/// scheme. Per-class penalties (`svm.penalty(i)`) are honored directly,
/// unlike the Platt driver.
pub fn train(svm: &mut Svm, kernel: &dyn KernelSource, config: FanConfig) -> TrainResult {
    let n = svm.training_count();
    let mut g = vec![-1.0; n];
    let max_iter = config.max_iter.unwrap_or(usize::MAX);

    let mut iter = 0usize;
    let exit_reason;

    loop {
        if iter >= max_iter {
            exit_reason = ExitReason::IterationCap;
            break;
        }

        let selected = select_working_set(svm, kernel, &g);
        let (i, j) = match selected {
            Some(pair) => pair,
            None => {
                exit_reason = ExitReason::Converged;
                break;
            }
        };

        let k11 = kernel.k(i, i);
        let k22 = kernel.k(j, j);
        let k12 = kernel.k(i, j);
        let (a, _floored) = curvature(k11, k22, k12);

        let y_i = svm.label(i);
        let y_j = svm.label(j);
        let old_alpha_i = svm.alpha(i);
        let old_alpha_j = svm.alpha(j);
        let b = -y_i * g[i] + y_j * g[j];

        let cand_i = old_alpha_i + y_i * (b / a);
        let cand_j = old_alpha_j - y_j * (b / a);
        let (new_alpha_i, new_alpha_j) = renormalize(
            cand_i,
            cand_j,
            y_i,
            y_j,
            svm.penalty(i),
            svm.penalty(j),
        );

        debug_assert!(new_alpha_i >= 0.0 && new_alpha_i <= svm.penalty(i));
        debug_assert!(new_alpha_j >= 0.0 && new_alpha_j <= svm.penalty(j));
        debug_assert!(
            (y_i * new_alpha_i + y_j * new_alpha_j - (y_i * old_alpha_i + y_j * old_alpha_j)).abs()
                < 1e-6
        );

        svm.alphas_mut()[i] = new_alpha_i;
        svm.alphas_mut()[j] = new_alpha_j;

        let delta_alpha_i = new_alpha_i - old_alpha_i;
        let delta_alpha_j = new_alpha_j - old_alpha_j;
        for t in 0..n {
            let delta_gt =
                y_i * svm.label(t) * kernel.k(i, t) * delta_alpha_i
                    + y_j * svm.label(t) * kernel.k(j, t) * delta_alpha_j;
            g[t] += delta_gt;
        }

        iter += 1;
        if iter % 100.min(n.max(1)) == 0 {
            log::debug!("fan: iter={} selected=({}, {})", iter, i, j);
        }
    }

    let bias = calculate_bias(svm, &g);
    svm.set_bias(bias);
    svm.set_cache(Cache::Gradient(g));

    log::debug!(
        "fan: training done after {} iterations ({:?})",
        iter,
        exit_reason
    );

    TrainResult {
        iterations: iter,
        exit_reason,
    }
}

/// Select (i, j) by the two-pass I_up/I_low, second-order scan. Returns
/// `None` once the duality gap estimate G_max - G_min falls below
/// [`EPS`], the signal to stop training.
fn select_working_set(svm: &Svm, kernel: &dyn KernelSource, g: &[f64]) -> Option<(usize, usize)> {
    let n = svm.training_count();
    let mut g_max = f64::NEG_INFINITY;
    let mut g_min = f64::INFINITY;

    let mut i = None;
    for t in 0..n {
        let y_t = svm.label(t);
        let a_t = svm.alpha(t);
        let in_up = (y_t == 1.0 && a_t < svm.penalty(t)) || (y_t == -1.0 && a_t > 0.0);
        if in_up {
            let score = -y_t * g[t];
            if score >= g_max {
                g_max = score;
                i = Some(t);
            }
        }
    }
    let i = i?;

    let mut j = None;
    let mut obj_min = f64::INFINITY;
    for t in 0..n {
        let y_t = svm.label(t);
        let a_t = svm.alpha(t);
        let in_low = (y_t == 1.0 && a_t > 0.0) || (y_t == -1.0 && a_t < svm.penalty(t));
        if !in_low {
            continue;
        }
        let b = g_max + y_t * g[t];
        let score = -y_t * g[t];
        if score <= g_min {
            g_min = score;
        }
        if b > 0.0 {
            let k11 = kernel.k(i, i);
            let k12 = kernel.k(i, t);
            let k22 = kernel.k(t, t);
            let (a, _floored) = curvature(k11, k22, k12);
            let candidate = -(b * b) / a;
            if candidate <= obj_min {
                j = Some(t);
                obj_min = candidate;
            }
        }
    }

    if g_max - g_min < EPS {
        None
    } else {
        j.map(|j| (i, j))
    }
}

/// Recover the bias from the KKT conditions at the current α/G, averaging
/// the unbound-support-vector envelope per class (or the bound envelope
/// midpoint when no class has an unbound support vector).
pub fn calculate_bias(svm: &Svm, g: &[f64]) -> f64 {
    let n = svm.training_count();

    let r1 = {
        let (mut nrfree, mut ub, mut lb, mut sum_free) = (0usize, f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for i in 0..n {
            if svm.label(i) != 1.0 {
                continue;
            }
            let yg = svm.label(i) * g[i];
            let a = svm.alpha(i);
            if a <= 0.0 {
                ub = ub.min(yg);
            } else if a >= svm.penalty(i) {
                lb = lb.max(yg);
            } else {
                nrfree += 1;
                sum_free += yg;
            }
        }
        if nrfree > 0 {
            sum_free / nrfree as f64
        } else {
            (ub + lb) / 2.0
        }
    };

    let r2 = {
        let (mut nrfree, mut ub, mut lb, mut sum_free) = (0usize, f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for i in 0..n {
            if svm.label(i) != -1.0 {
                continue;
            }
            let yg = svm.label(i) * g[i];
            let a = svm.alpha(i);
            if a <= 0.0 {
                lb = lb.max(yg);
            } else if a >= svm.penalty(i) {
                ub = ub.min(yg);
            } else {
                nrfree += 1;
                sum_free += yg;
            }
        }
        if nrfree > 0 {
            sum_free / nrfree as f64
        } else {
            (ub + lb) / 2.0
        }
    };

    (r2 + r1) / 2.0
}
