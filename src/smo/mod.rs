//! Sequential Minimal Optimization: the shared two-variable update primitive
//! and the kernel-source capability both drivers (`platt`, `fan`) read
//! through.

pub mod fan;
pub mod platt;

/// Curvature floor. An indefinite or numerically-zero curvature is replaced
/// with this value rather than dividing by (near) zero.
pub const TAU: f64 = 1e-12;

/// Tolerance used both to break near-ties when picking between the two box
/// endpoints and to decide whether a step made "no progress".
pub const EPS: f64 = 1e-3;

/// A read-only source of kernel evaluations K(i, j), indexed by training/test
/// position.
///
/// The only implementation shipped by this crate is
/// [`crate::gram::GramMatrix`] (via [`GramKernelSource`]), matching the
/// Non-goal of not supporting on-the-fly kernel evaluation. The trait exists
/// so the solver depends on the operation, not the representation, and so
/// tests can exercise it against a hand-crafted matrix.
pub trait KernelSource {
    /// K(i, j).
    fn k(&self, i: usize, j: usize) -> f64;
}

/// A [`KernelSource`] backed by a precomputed [`crate::gram::GramMatrix`].
pub struct GramKernelSource<'a> {
    gram: &'a crate::gram::GramMatrix,
}

impl<'a> GramKernelSource<'a> {
    /// Wrap a Gram matrix as a kernel source.
    pub fn new(gram: &'a crate::gram::GramMatrix) -> GramKernelSource<'a> {
        GramKernelSource { gram }
    }
}

impl<'a> KernelSource for GramKernelSource<'a> {
    #[inline]
    fn k(&self, i: usize, j: usize) -> f64 {
        self.gram.get(i, j)
    }
}

/// The curvature a = k11 + k22 − 2·k12 of the two-variable subproblem,
/// floored to [`TAU`] when non-positive (indefinite kernel or numerical
/// zero), together with whether flooring occurred.
#[inline]
pub fn curvature(k11: f64, k22: f64, k12: f64) -> (f64, bool) {
    let raw = k11 + k22 - 2.0 * k12;
    if raw <= 0.0 {
        (TAU, true)
    } else {
        (raw, false)
    }
}

/// The box [L, H] that αⱼ must stay within so that αᵢ stays within [0, Cᵢ]
/// and the equality constraint yᵢαᵢ + yⱼαⱼ = const is respected.
#[inline]
pub fn box_bounds(y_i: f64, y_j: f64, alpha_i: f64, alpha_j: f64, c_i: f64, c_j: f64) -> (f64, f64) {
    if y_i == y_j {
        let gamma = alpha_i + alpha_j;
        (f64::max(0.0, gamma - c_j), f64::min(c_i, gamma))
    } else {
        let gamma = alpha_i - alpha_j;
        (f64::max(0.0, gamma), f64::min(c_i, c_j + gamma))
    }
}

/// Renormalize a candidate (αᵢ, αⱼ) pair into feasibility by reclipping αᵢ
/// to [0, Cᵢ], redetermining αⱼ from the equality constraint, reclipping αⱼ
/// to [0, Cⱼ], and redetermining αᵢ. This is the two-stage feasibility pass;
/// it yields the same result as a one-sided clip but is numerically safer on
/// ties, which is why the Fan driver uses it directly.
#[inline]
pub fn renormalize(
    alpha_i: f64,
    alpha_j: f64,
    y_i: f64,
    y_j: f64,
    c_i: f64,
    c_j: f64,
) -> (f64, f64) {
    let sum = y_i * alpha_i + y_j * alpha_j;
    let ai = alpha_i.max(0.0).min(c_i);
    let aj = (y_j * (sum - y_i * ai)).max(0.0).min(c_j);
    let ai = y_i * (sum - y_j * aj);
    (ai, aj)
}

/// Whether the realized change in αⱼ is too small to count as progress.
#[inline]
pub fn no_progress(new_alpha_j: f64, old_alpha_j: f64) -> bool {
    (new_alpha_j - old_alpha_j).abs() < EPS * (new_alpha_j + old_alpha_j + EPS)
}

/// Why a training run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The working-set selection found no KKT-violating pair (or, for Platt,
    /// an examine-all pass changed nothing).
    Converged,
    /// `max_iter` outer-loop iterations were exhausted first.
    IterationCap,
}

/// The outcome of a training run: how many outer-loop iterations ran and why
/// it stopped. Not an error — reaching the iteration cap is an explicit,
/// inspectable outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainResult {
    /// Number of outer-loop iterations performed.
    pub iterations: usize,
    /// Why the loop stopped.
    pub exit_reason: ExitReason,
}
