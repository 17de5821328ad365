//! Sparse feature vectors and the dot product that underlies every kernel.

use crate::error::Failed;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single (index, value) entry of a sparse feature vector.
///
/// Indices are 1-based, matching the libsvm-format convention the external
/// record parser produces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    /// 1-based feature index.
    pub index: u32,
    /// Feature value.
    pub value: f64,
}

impl Feature {
    /// Create a new feature entry.
    pub fn new(index: u32, value: f64) -> Feature {
        Feature { index, value }
    }
}

/// A labeled, sparse real-valued training or test exemplar.
///
/// Features are stored in strictly ascending index order so that
/// [`dot`] can merge two vectors in a single linear pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseVector {
    features: Vec<Feature>,
    label: f64,
    factor: f64,
    norm_sq: f64,
}

impl SparseVector {
    /// Build a sparse vector from features already in ascending index order.
    ///
    /// # Errors
    /// Returns [`FailedKind::InvalidInput`](crate::error::FailedKind::InvalidInput) if
    /// indices are not strictly ascending, any index is 0, any value is
    /// non-finite, or the label is not +1/-1.
    pub fn new(features: Vec<Feature>, label: f64, factor: f64) -> Result<SparseVector, Failed> {
        if label != 1.0 && label != -1.0 {
            return Err(Failed::invalid_input(format!(
                "label must be +1 or -1, got {}",
                label
            )));
        }
        if !factor.is_finite() {
            return Err(Failed::invalid_input("factor must be finite"));
        }
        let mut prev: Option<u32> = None;
        for f in &features {
            if f.index == 0 {
                return Err(Failed::invalid_input("feature indices must be >= 1"));
            }
            if !f.value.is_finite() {
                return Err(Failed::invalid_input(format!(
                    "feature {} has a non-finite value",
                    f.index
                )));
            }
            if let Some(p) = prev {
                if f.index <= p {
                    return Err(Failed::invalid_input(
                        "feature indices must be strictly ascending",
                    ));
                }
            }
            prev = Some(f.index);
        }

        let norm_sq = dot_features(&features, &features);

        Ok(SparseVector {
            features,
            label,
            factor,
            norm_sq,
        })
    }

    /// Build a sparse vector with the default factor of 1.0.
    pub fn with_label(features: Vec<Feature>, label: f64) -> Result<SparseVector, Failed> {
        SparseVector::new(features, label, 1.0)
    }

    /// The feature entries, in ascending index order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// The label, +1.0 or -1.0.
    pub fn label(&self) -> f64 {
        self.label
    }

    /// The multiplicative factor (1.0 unless overridden at construction).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// The cached squared Euclidean norm, ‖x‖².
    pub fn norm_sq(&self) -> f64 {
        self.norm_sq
    }
}

/// Inner product of two ascending-index sparse vectors.
///
/// Merges the two feature lists in a single linear pass: advances whichever
/// side has the smaller current index, and on matching indices accumulates
/// the product of values and advances both. Either vector being empty yields
/// zero.
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    dot_features(&a.features, &b.features)
}

fn dot_features(a: &[Feature], b: &[Feature]) -> f64 {
    let mut sum = 0.0;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].index.cmp(&b[j].index) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].value * b[j].value;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec2(a: f64, b: f64, label: f64) -> SparseVector {
        SparseVector::with_label(vec![Feature::new(1, a), Feature::new(2, b)], label).unwrap()
    }

    #[test]
    fn dot_product_merges_matching_indices() {
        let a = SparseVector::with_label(
            vec![Feature::new(1, 2.0), Feature::new(3, 5.0)],
            1.0,
        )
        .unwrap();
        let b = SparseVector::with_label(
            vec![Feature::new(2, 9.0), Feature::new(3, 4.0)],
            1.0,
        )
        .unwrap();
        // only index 3 overlaps: 5.0 * 4.0
        assert_eq!(dot(&a, &b), 20.0);
    }

    #[test]
    fn dot_product_with_empty_vector_is_zero() {
        let a = SparseVector::with_label(vec![], 1.0).unwrap();
        let b = vec2(1.0, 2.0, -1.0);
        assert_eq!(dot(&a, &b), 0.0);
    }

    #[test]
    fn norm_sq_matches_self_dot_product() {
        let v = vec2(3.0, 4.0, 1.0);
        assert_eq!(v.norm_sq(), dot(&v, &v));
        assert_eq!(v.norm_sq(), 25.0);
    }

    #[test]
    fn rejects_non_ascending_indices() {
        let err = SparseVector::with_label(
            vec![Feature::new(2, 1.0), Feature::new(1, 1.0)],
            1.0,
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailedKind::InvalidInput);
    }

    #[test]
    fn rejects_zero_index() {
        assert!(SparseVector::with_label(vec![Feature::new(0, 1.0)], 1.0).is_err());
    }

    #[test]
    fn rejects_bad_label() {
        assert!(SparseVector::with_label(vec![], 0.5).is_err());
    }
}
