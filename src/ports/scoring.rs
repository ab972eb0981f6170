//! Scoring ports: Traits for the per-condition model collaborators.
//!
//! These traits abstract the trained classifier and its attribution
//! mechanism from the engine. Implementations are loaded once at startup and
//! shared read-only across concurrent requests, hence `Send + Sync` and
//! `&self` receivers only.

use crate::domain::EncodedFeatureVector;

/// Errors raised by a classifier or explainer during a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Non-finite input for feature {0}")]
    NonFiniteInput(String),

    #[error("Invalid class probabilities: [{0}, {1}]")]
    InvalidProbability(f64, f64),

    #[error("Attribution returned {actual} values for {expected} features")]
    AttributionLength { expected: usize, actual: usize },

    #[error("Model backend failure: {0}")]
    Backend(String),
}

/// Binary risk classifier for one condition.
pub trait Classifier: Send + Sync {
    /// Class probabilities `[P(class = 0), P(class = 1)]` for one instance.
    ///
    /// # Errors
    /// Returns `ScoringError` if the vector does not fit the model.
    fn predict_proba(&self, features: &EncodedFeatureVector) -> Result<[f64; 2], ScoringError>;
}

/// Per-feature attribution for one condition's classifier.
pub trait Explainer: Send + Sync {
    /// Signed contribution per feature, aligned with the feature order.
    ///
    /// Positive values push the prediction toward the positive class.
    ///
    /// # Errors
    /// Returns `ScoringError` if the vector does not fit the model.
    fn attribute(&self, features: &EncodedFeatureVector) -> Result<Vec<f64>, ScoringError>;
}
