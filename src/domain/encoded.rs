//! Encoded feature vectors handed to the model collaborators.

use serde::{Deserialize, Serialize};

/// Numeric model input aligned to the trained feature order.
///
/// Categorical values are already replaced by their integer codes. Only the
/// normalizer constructs these for requests, so the length always matches
/// the feature order established at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedFeatureVector(Vec<f64>);

impl EncodedFeatureVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}
