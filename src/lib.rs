//! A Sequential Minimal Optimization solver for the soft-margin binary
//! support vector machine dual problem.
//!
//! Two working-set selection strategies are implemented as independent
//! drivers over a shared two-variable update primitive: the original Platt
//! (1998) heuristic ([`smo::platt`]) and the second-order scheme of Fan,
//! Chen & Lin (2005) ([`smo::fan`]). Both train against a dense,
//! precomputed Gram matrix ([`gram::GramMatrix`]) built from one of four
//! closed-form kernels ([`kernel::KernelFunction`]).
//!
//! ```
//! use rand::SeedableRng;
//! use xsvm::gram::GramMatrix;
//! use xsvm::kernel::KernelFunction;
//! use xsvm::smo::platt::{self, PlattConfig};
//! use xsvm::smo::GramKernelSource;
//! use xsvm::svm::Svm;
//! use xsvm::vector::{Feature, SparseVector};
//!
//! let vectors = vec![
//!     SparseVector::with_label(vec![Feature::new(1, 2.0)], 1.0).unwrap(),
//!     SparseVector::with_label(vec![Feature::new(1, 3.0)], 1.0).unwrap(),
//!     SparseVector::with_label(vec![Feature::new(1, -2.0)], -1.0).unwrap(),
//!     SparseVector::with_label(vec![Feature::new(1, -3.0)], -1.0).unwrap(),
//! ];
//! let labels: Vec<f64> = vectors.iter().map(|v| v.label()).collect();
//!
//! let gram = GramMatrix::compute(&vectors, &KernelFunction::Linear);
//! let source = GramKernelSource::new(&gram);
//! let mut svm = Svm::with_single_penalty(labels, 4, 0, 10.0).unwrap();
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
//!
//! platt::train(&mut svm, &source, 10.0, PlattConfig::default(), &mut rng);
//! assert_eq!(svm.decision_value(&source, 0).signum(), 1.0);
//! ```

pub mod diagnostics;
pub mod error;
pub mod gram;
pub mod kernel;
pub mod smo;
pub mod svm;
pub mod train;
pub mod vector;

pub use error::{Failed, FailedKind};
