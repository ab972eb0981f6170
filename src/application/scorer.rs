//! Condition scoring: classifier probability to risk category.

use crate::domain::{EncodedFeatureVector, RiskCategory};
use crate::ports::{Classifier, ScoringError};

const SUM_TOLERANCE: f64 = 1e-6;

/// Score one condition.
///
/// Returns the positive-class probability (unrounded) and its category.
///
/// # Errors
/// Propagates the classifier's error, or `ScoringError::InvalidProbability`
/// if the returned pair is non-finite, outside `[0, 1]`, or does not sum to 1.
pub fn score(
    vector: &EncodedFeatureVector,
    classifier: &dyn Classifier,
) -> Result<(f64, RiskCategory), ScoringError> {
    let [p0, p1] = classifier.predict_proba(vector)?;

    let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
    if !in_unit(p0) || !in_unit(p1) || (p0 + p1 - 1.0).abs() > SUM_TOLERANCE {
        return Err(ScoringError::InvalidProbability(p0, p1));
    }

    Ok((p1, RiskCategory::from_probability(p1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed([f64; 2]);

    impl Classifier for Fixed {
        fn predict_proba(&self, _: &EncodedFeatureVector) -> Result<[f64; 2], ScoringError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn predict_proba(&self, _: &EncodedFeatureVector) -> Result<[f64; 2], ScoringError> {
            Err(ScoringError::Backend("model unavailable".into()))
        }
    }

    fn vector() -> EncodedFeatureVector {
        EncodedFeatureVector::new(vec![0.0; 3])
    }

    #[test]
    fn test_score_maps_category() {
        let (p, category) = score(&vector(), &Fixed([0.35, 0.65])).expect("Should score");
        assert!((p - 0.65).abs() < 1e-12);
        assert_eq!(category, RiskCategory::High);

        let (_, category) = score(&vector(), &Fixed([0.2, 0.8])).expect("Should score");
        assert_eq!(category, RiskCategory::Critical);
    }

    #[test]
    fn test_rejects_invalid_probabilities() {
        assert!(score(&vector(), &Fixed([0.5, 0.6])).is_err());
        assert!(score(&vector(), &Fixed([-0.1, 1.1])).is_err());
        assert!(score(&vector(), &Fixed([f64::NAN, 0.5])).is_err());
    }

    #[test]
    fn test_classifier_error_propagates() {
        let err = score(&vector(), &Failing).expect_err("Must fail");
        assert_eq!(err, ScoringError::Backend("model unavailable".into()));
    }
}
