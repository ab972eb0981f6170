//! Report types returned to the caller.
//!
//! Field names on the wire follow the published report shape; see the
//! `serde` renames.

use serde::{Deserialize, Serialize};

use super::patient::FeatureValue;
use super::risk::{Direction, MagnitudeBand, RiskCategory};

/// Decimal places kept for scores and contributions in the report.
pub const REPORT_PRECISION: usize = 4;

/// Round to [`REPORT_PRECISION`] decimal places.
///
/// Rounds the exact binary value, so `0.00895` (stored just below the tie)
/// becomes `0.0089`.
#[must_use]
pub fn round_score(value: f64) -> f64 {
    format!("{value:.prec$}", prec = REPORT_PRECISION)
        .parse()
        .unwrap_or(value)
}

/// How one feature moved one condition's prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    #[serde(rename = "feature")]
    pub display_name: String,
    pub feature_key: String,
    /// Value as supplied on the record (pre-encoding), else the encoded value.
    #[serde(rename = "value")]
    pub raw_value: FeatureValue,
    pub direction: Direction,
    #[serde(rename = "impact")]
    pub magnitude_band: MagnitudeBand,
    /// Signed contribution, rounded to report precision.
    #[serde(rename = "shap_value")]
    pub contribution_score: f64,
    #[serde(rename = "explanation")]
    pub explanation_text: String,
    /// Originating condition, only set on global factors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl FeatureImpact {
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.contribution_score.abs()
    }

    /// Copy tagged with the condition it came from.
    #[must_use]
    pub fn tagged(&self, condition: &str) -> Self {
        Self {
            condition: Some(condition.to_string()),
            ..self.clone()
        }
    }
}

/// Scored, explained result for a single condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    #[serde(rename = "condition")]
    pub display_name: String,
    pub condition_key: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    /// At most eight factors, strongest first.
    pub top_factors: Vec<FeatureImpact>,
    pub recommendations: Vec<String>,
    pub clinical_summary: String,
}

/// The multi-condition report for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub overall_risk_score: f64,
    pub overall_risk_category: RiskCategory,
    /// One entry per condition, in declaration order.
    pub conditions: Vec<ConditionResult>,
    /// At most ten factors, unique by feature key, strongest first.
    pub global_top_factors: Vec<FeatureImpact>,
}

impl PredictionReport {
    /// Result for a condition key, if present.
    #[must_use]
    pub fn condition(&self, key: &str) -> Option<&ConditionResult> {
        self.conditions.iter().find(|c| c.condition_key == key)
    }
}
