//! Attribution ranking: explainer output to ordered feature impacts.

use crate::domain::{
    round_score, Direction, EncodedFeatureVector, FeatureCatalog, FeatureImpact, FeatureValue,
    MagnitudeBand, PatientRecord,
};
use crate::ports::{Explainer, ScoringError};

/// Contributions below this magnitude are dropped entirely.
pub const NEGLIGIBLE_CONTRIBUTION: f64 = 0.001;

/// Factors kept per condition.
pub const TOP_FACTORS_PER_CONDITION: usize = 8;

/// Every non-negligible impact for one condition, strongest first.
///
/// Ordering is by descending magnitude of the rounded contribution; equal
/// magnitudes keep trained feature order. This untruncated list also feeds
/// the global factor ranking.
///
/// # Errors
/// Propagates the explainer's error, or returns `ScoringError` if the
/// attribution length differs from the feature order or a value is non-finite.
pub fn rank_all(
    vector: &EncodedFeatureVector,
    raw: &PatientRecord,
    explainer: &dyn Explainer,
    feature_order: &[String],
    catalog: &FeatureCatalog,
) -> Result<Vec<FeatureImpact>, ScoringError> {
    let contributions = explainer.attribute(vector)?;
    if contributions.len() != feature_order.len() {
        return Err(ScoringError::AttributionLength {
            expected: feature_order.len(),
            actual: contributions.len(),
        });
    }

    let mut impacts = Vec::new();
    for (i, (key, &contribution)) in feature_order.iter().zip(&contributions).enumerate() {
        if !contribution.is_finite() {
            return Err(ScoringError::Backend(format!(
                "non-finite attribution for {key}"
            )));
        }
        if contribution.abs() < NEGLIGIBLE_CONTRIBUTION {
            continue;
        }

        let raw_value = raw
            .get(key)
            .cloned()
            .or_else(|| vector.get(i).map(FeatureValue::Real))
            .unwrap_or(FeatureValue::Real(0.0));

        impacts.push(FeatureImpact {
            display_name: catalog.display_name(key).to_string(),
            feature_key: key.clone(),
            raw_value,
            direction: Direction::of(contribution),
            magnitude_band: MagnitudeBand::of(contribution),
            contribution_score: round_score(contribution),
            explanation_text: catalog.explanation(key).to_string(),
            condition: None,
        });
    }

    impacts.sort_by(|a, b| b.magnitude().total_cmp(&a.magnitude()));
    Ok(impacts)
}

/// Ranked impacts truncated to `top_k`.
///
/// # Errors
/// Same as [`rank_all`].
pub fn rank(
    vector: &EncodedFeatureVector,
    raw: &PatientRecord,
    explainer: &dyn Explainer,
    feature_order: &[String],
    catalog: &FeatureCatalog,
    top_k: usize,
) -> Result<Vec<FeatureImpact>, ScoringError> {
    let mut impacts = rank_all(vector, raw, explainer, feature_order, catalog)?;
    impacts.truncate(top_k);
    Ok(impacts)
}
