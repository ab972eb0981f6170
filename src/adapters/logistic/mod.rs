//! Logistic adapter: Implementation of Classifier and Explainer for exported
//! logistic regression models.
//!
//! The offline training pipeline exports each condition's model as JSON:
//! standardization parameters plus coefficients in standardized space.
//!
//! # Attribution
//!
//! For a linear model in log-odds space with independent features and the
//! scaler mean as background, the Shapley value of feature `i` is exactly
//! `coef_i * (x_i - mean_i) / scale_i`. The explainer returns those terms, so
//! they sum to the instance's log-odds minus the intercept.

use serde::{Deserialize, Serialize};

use crate::adapters::directory::ArtifactError;
use crate::domain::EncodedFeatureVector;
use crate::ports::{Classifier, Explainer, ScoringError};

/// Tolerance when checking that class probabilities sum to one.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Model parameters as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    /// Condition key the model was trained for.
    pub condition: String,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
}

/// A validated logistic model, usable as both classifier and explainer.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    params: ExportedLogisticModel,
}

impl LogisticModel {
    /// Validate exported parameters against the trained feature order.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` if lengths disagree, the feature names
    /// differ from `feature_order`, or any parameter is unusable.
    pub fn from_export(
        params: ExportedLogisticModel,
        feature_order: &[String],
    ) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            name: format!("{}_model.json", params.condition),
            reason,
        };

        if params.feature_names != feature_order {
            return Err(invalid(
                "feature_names do not match the trained feature order".to_string(),
            ));
        }

        let n = params.feature_names.len();
        if params.coefficients.len() != n
            || params.scaler_mean.len() != n
            || params.scaler_scale.len() != n
        {
            return Err(invalid(format!(
                "parameter lengths do not match {n} features"
            )));
        }

        if !params.intercept.is_finite()
            || params.coefficients.iter().any(|c| !c.is_finite())
            || params.scaler_mean.iter().any(|m| !m.is_finite())
        {
            return Err(invalid("non-finite model parameter".to_string()));
        }

        if let Some(i) = params
            .scaler_scale
            .iter()
            .position(|s| !s.is_finite() || *s == 0.0)
        {
            return Err(invalid(format!(
                "unusable scale for feature {}",
                params.feature_names[i]
            )));
        }

        Ok(Self { params })
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.params.feature_names.len()
    }

    /// Per-feature terms of the linear predictor, `coef * standardized(x)`.
    fn terms(&self, features: &EncodedFeatureVector) -> Result<Vec<f64>, ScoringError> {
        let expected = self.feature_count();
        if features.len() != expected {
            return Err(ScoringError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        features
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                if !x.is_finite() {
                    return Err(ScoringError::NonFiniteInput(
                        self.params.feature_names[i].clone(),
                    ));
                }
                let standardized = (x - self.params.scaler_mean[i]) / self.params.scaler_scale[i];
                Ok(self.params.coefficients[i] * standardized)
            })
            .collect()
    }

    /// Log-odds of the positive class.
    fn log_odds(&self, features: &EncodedFeatureVector) -> Result<f64, ScoringError> {
        Ok(self.params.intercept + self.terms(features)?.iter().sum::<f64>())
    }
}

/// Logistic function, evaluated without overflow for large `|z|`.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &EncodedFeatureVector) -> Result<[f64; 2], ScoringError> {
        let p = sigmoid(self.log_odds(features)?);
        let proba = [1.0 - p, p];

        if !(0.0..=1.0).contains(&p) || (proba[0] + proba[1] - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ScoringError::InvalidProbability(proba[0], proba[1]));
        }
        Ok(proba)
    }
}

impl Explainer for LogisticModel {
    fn attribute(&self, features: &EncodedFeatureVector) -> Result<Vec<f64>, ScoringError> {
        self.terms(features)
    }
}
