//! Cross-condition aggregation into the final report.

use std::collections::HashSet;

use crate::domain::{round_score, ConditionResult, FeatureImpact, PredictionReport, RiskCategory};

/// Factors kept in the global ranking.
pub const GLOBAL_TOP_FACTORS: usize = 10;

/// A finished condition result plus every non-negligible impact behind it.
#[derive(Debug, Clone)]
pub struct ConditionOutcome {
    pub result: ConditionResult,
    /// Untruncated ranking, strongest first.
    pub all_factors: Vec<FeatureImpact>,
}

/// Fold per-condition outcomes, in declaration order, into the report.
///
/// The overall category is the first maximal category. The overall score is
/// the maximum score, which may come from a different condition.
#[must_use]
pub fn aggregate(outcomes: Vec<ConditionOutcome>) -> PredictionReport {
    let mut overall_category = RiskCategory::Low;
    let mut overall_score = 0.0_f64;
    for outcome in &outcomes {
        if outcome.result.risk_category > overall_category {
            overall_category = outcome.result.risk_category;
        }
        overall_score = overall_score.max(outcome.result.risk_score);
    }

    let global_top_factors = global_factors(&outcomes);

    PredictionReport {
        overall_risk_score: round_score(overall_score),
        overall_risk_category: overall_category,
        conditions: outcomes.into_iter().map(|o| o.result).collect(),
        global_top_factors,
    }
}

/// Pool every condition's impacts, rank by magnitude, keep the strongest per feature.
fn global_factors(outcomes: &[ConditionOutcome]) -> Vec<FeatureImpact> {
    let mut pooled: Vec<FeatureImpact> = outcomes
        .iter()
        .flat_map(|o| {
            o.all_factors
                .iter()
                .map(|f| f.tagged(&o.result.display_name))
        })
        .collect();
    pooled.sort_by(|a, b| b.magnitude().total_cmp(&a.magnitude()));

    let mut seen = HashSet::new();
    pooled
        .into_iter()
        .filter(|f| seen.insert(f.feature_key.clone()))
        .take(GLOBAL_TOP_FACTORS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, FeatureValue, MagnitudeBand};

    fn factor(key: &str, contribution: f64) -> FeatureImpact {
        FeatureImpact {
            display_name: key.to_string(),
            feature_key: key.to_string(),
            raw_value: FeatureValue::Integer(0),
            direction: Direction::of(contribution),
            magnitude_band: MagnitudeBand::of(contribution),
            contribution_score: contribution,
            explanation_text: String::new(),
            condition: None,
        }
    }

    fn outcome(name: &str, score: f64, factors: Vec<FeatureImpact>) -> ConditionOutcome {
        ConditionOutcome {
            result: ConditionResult {
                display_name: name.to_string(),
                condition_key: name.to_lowercase(),
                risk_score: score,
                risk_category: RiskCategory::from_probability(score),
                top_factors: factors.iter().take(8).cloned().collect(),
                recommendations: Vec::new(),
                clinical_summary: String::new(),
            },
            all_factors: factors,
        }
    }

    #[test]
    fn test_overall_is_max_category_and_max_score() {
        let report = aggregate(vec![
            outcome("A", 0.1, vec![]),
            outcome("B", 0.55, vec![]),
            outcome("C", 0.3, vec![]),
        ]);
        assert_eq!(report.overall_risk_category, RiskCategory::High);
        assert_eq!(report.overall_risk_score, 0.55);
        assert_eq!(report.conditions.len(), 3);
        assert_eq!(report.conditions[1].display_name, "B");
    }

    #[test]
    fn test_all_low() {
        let report = aggregate(vec![
            outcome("A", 0.12, vec![]),
            outcome("B", 0.19, vec![]),
            outcome("C", 0.01, vec![]),
        ]);
        assert_eq!(report.overall_risk_category, RiskCategory::Low);
        assert_eq!(report.overall_risk_score, 0.19);
    }

    #[test]
    fn test_global_factors_dedup_keeps_strongest() {
        let report = aggregate(vec![
            outcome("A", 0.1, vec![factor("x", 0.4), factor("y", -0.2)]),
            outcome("B", 0.1, vec![factor("y", 0.9), factor("x", 0.1)]),
        ]);

        let keys: Vec<&str> = report
            .global_top_factors
            .iter()
            .map(|f| f.feature_key.as_str())
            .collect();
        assert_eq!(keys, vec!["y", "x"]);
        assert_eq!(report.global_top_factors[0].condition.as_deref(), Some("B"));
        assert_eq!(report.global_top_factors[1].condition.as_deref(), Some("A"));
        assert!(report.conditions[0].top_factors[0].condition.is_none());
    }

    #[test]
    fn test_global_factors_capped_and_ordered() {
        let many: Vec<FeatureImpact> = (0..12)
            .map(|i| factor(&format!("f{i}"), 0.01 * f64::from(i + 1)))
            .collect();
        let more: Vec<FeatureImpact> = (0..12)
            .map(|i| factor(&format!("g{i}"), -0.015 * f64::from(i + 1)))
            .collect();
        let report = aggregate(vec![outcome("A", 0.1, many), outcome("B", 0.1, more)]);

        let global = &report.global_top_factors;
        assert_eq!(global.len(), GLOBAL_TOP_FACTORS);
        assert!(global.windows(2).all(|w| w[0].magnitude() >= w[1].magnitude()));
        let unique: HashSet<&str> = global.iter().map(|f| f.feature_key.as_str()).collect();
        assert_eq!(unique.len(), global.len());
    }

    #[test]
    fn test_global_factors_draw_on_untruncated_rankings() {
        // Nine factors for A; the ninth falls outside A's top eight but still
        // outweighs everything B contributes.
        let strong: Vec<FeatureImpact> = (0..9)
            .map(|i| factor(&format!("a{i}"), 2.0 - 0.1 * f64::from(i)))
            .collect();
        let weak: Vec<FeatureImpact> = (0..5)
            .map(|i| factor(&format!("b{i}"), 0.5 - 0.05 * f64::from(i)))
            .collect();
        let report = aggregate(vec![outcome("A", 0.9, strong), outcome("B", 0.1, weak)]);

        assert!(report.conditions[0]
            .top_factors
            .iter()
            .all(|f| f.feature_key != "a8"));
        let ninth = report
            .global_top_factors
            .iter()
            .position(|f| f.feature_key == "a8")
            .expect("Ninth-ranked factor should reach the global list");
        assert_eq!(ninth, 8);
        assert_eq!(report.global_top_factors[9].feature_key, "b0");
    }

    #[test]
    fn test_first_condition_wins_ties_in_pooled_order() {
        let report = aggregate(vec![
            outcome("A", 0.1, vec![factor("x", 0.5)]),
            outcome("B", 0.1, vec![factor("x", -0.5)]),
        ]);
        assert_eq!(report.global_top_factors.len(), 1);
        assert_eq!(report.global_top_factors[0].condition.as_deref(), Some("A"));
    }
}
