//! The four closed-form kernels over sparse vectors.
//!
//! Kernel selection happens through an integer tag plus a shared parameter
//! bundle, matching the libsvm convention of numeric kernel types, rather
//! than one type per kernel. A `Kernel` trait is kept at the boundary so
//! that a future on-the-fly kernel could implement it without touching the
//! solver.

use crate::error::Failed;
use crate::vector::{dot, SparseVector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tag identifying which closed-form kernel to use.
pub const LINEAR: i32 = 0;
/// Tag identifying which closed-form kernel to use.
pub const POLY: i32 = 1;
/// Tag identifying which closed-form kernel to use.
pub const RBF: i32 = 2;
/// Tag identifying which closed-form kernel to use.
pub const SIGMOID: i32 = 3;

/// A kernel function evaluated over two [`SparseVector`]s.
///
/// The solver never calls this trait directly; it reads from a
/// precomputed [`crate::gram::GramMatrix`] through a
/// [`crate::smo::KernelSource`] instead. This trait is the seam the Gram
/// builder (and, eventually, an on-the-fly kernel source) calls through.
pub trait Kernel {
    /// Evaluate K(a, b).
    fn apply(&self, a: &SparseVector, b: &SparseVector) -> f64;
}

/// Parameters shared by the polynomial, RBF, and sigmoid kernels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KernelParams {
    /// Linear coefficient multiplying the dot product (poly, sigmoid).
    pub coef_lin: f64,
    /// Additive constant (poly, sigmoid).
    pub coef_const: f64,
    /// Exponent (poly only).
    pub poly_degree: i32,
    /// RBF width parameter γ.
    pub rbf_gamma: f64,
}

impl Default for KernelParams {
    fn default() -> Self {
        KernelParams {
            coef_lin: 1.0,
            coef_const: 0.0,
            poly_degree: 2,
            rbf_gamma: 1.0,
        }
    }
}

/// A concrete, closed-form kernel selection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KernelFunction {
    /// ⟨a, b⟩
    Linear,
    /// (coef_lin · ⟨a, b⟩ + coef_const)^poly_degree
    Polynomial(KernelParams),
    /// exp(−rbf_gamma · (‖a‖² − 2⟨a, b⟩ + ‖b‖²))
    Rbf(KernelParams),
    /// tanh(coef_lin · ⟨a, b⟩ + coef_const)
    Sigmoid(KernelParams),
}

impl KernelFunction {
    /// Resolve a kernel from the {LINEAR, POLY, RBF, SIGMOID} integer tag
    /// used by the original CLI, plus the parameter bundle.
    ///
    /// # Errors
    /// Returns [`FailedKind::InvalidKernel`](crate::error::FailedKind::InvalidKernel)
    /// for any tag outside 0..=3.
    pub fn from_tag(tag: i32, params: KernelParams) -> Result<KernelFunction, Failed> {
        match tag {
            LINEAR => Ok(KernelFunction::Linear),
            POLY => Ok(KernelFunction::Polynomial(params)),
            RBF => Ok(KernelFunction::Rbf(params)),
            SIGMOID => Ok(KernelFunction::Sigmoid(params)),
            other => Err(Failed::invalid_kernel(format!(
                "unknown kernel tag {}",
                other
            ))),
        }
    }
}

impl Kernel for KernelFunction {
    fn apply(&self, a: &SparseVector, b: &SparseVector) -> f64 {
        match self {
            KernelFunction::Linear => dot(a, b),
            KernelFunction::Polynomial(p) => {
                (p.coef_lin * dot(a, b) + p.coef_const).powi(p.poly_degree)
            }
            KernelFunction::Rbf(p) => {
                (-p.rbf_gamma * (a.norm_sq() - 2.0 * dot(a, b) + b.norm_sq())).exp()
            }
            KernelFunction::Sigmoid(p) => (p.coef_lin * dot(a, b) + p.coef_const).tanh(),
        }
    }
}
