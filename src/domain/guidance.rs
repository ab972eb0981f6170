//! Clinical guidance: recommendation tables and narrative summaries.

use super::condition::Condition;
use super::report::FeatureImpact;
use super::risk::{Direction, RiskCategory};

/// Number of risk-increasing factors named in a summary.
const SUMMARY_FACTOR_LIMIT: usize = 2;

/// Ordered clinical actions for a condition at a risk category.
#[must_use]
pub fn recommendations(condition: Condition, category: RiskCategory) -> &'static [&'static str] {
    use Condition::*;
    use RiskCategory::*;

    match (condition, category) {
        (Hemorrhage, Low) => &[
            "Routine postpartum monitoring per standard protocol",
            "Ensure IV access is established",
        ],
        (Hemorrhage, Moderate) => &[
            "Type and screen on admission",
            "Ensure large-bore IV access",
            "Active management of third stage of labor",
            "Monitor for signs of uterine atony",
        ],
        (Hemorrhage, High) => &[
            "Type and crossmatch 2 units pRBCs",
            "Ensure large-bore IV access (two sites)",
            "Active management of third stage of labor",
            "Have uterotonics readily available",
            "Notify anesthesia team of high-risk status",
            "Consider cell saver availability",
        ],
        (Hemorrhage, Critical) => &[
            "ACTIVATE Massive Transfusion Protocol readiness",
            "Type and crossmatch 4 units pRBCs",
            "Ensure dual large-bore IV access",
            "Anesthesia and surgery teams on standby",
            "Have uterotonic agents drawn and ready",
            "Prepare for possible interventional radiology",
            "Consider ICU bed reservation",
        ],
        (Preeclampsia, Low) => &[
            "Routine blood pressure monitoring postpartum",
            "Standard discharge BP instructions",
        ],
        (Preeclampsia, Moderate) => &[
            "Serial blood pressure monitoring every 4 hours",
            "Monitor for headache, visual changes, epigastric pain",
            "Check labs: CBC, CMP, LDH",
            "Consider 24-48 hour magnesium sulfate prophylaxis",
        ],
        (Preeclampsia, High) => &[
            "Continuous blood pressure monitoring",
            "Magnesium sulfate for seizure prophylaxis",
            "Serial labs every 6 hours (CBC, CMP, LDH, uric acid)",
            "Consider antihypertensive therapy",
            "Monitor strict I&O",
            "Notify attending of high-risk status",
        ],
        (Preeclampsia, Critical) => &[
            "IMMEDIATE magnesium sulfate infusion",
            "IV labetalol or hydralazine for blood pressure control",
            "Continuous telemetry monitoring",
            "Serial labs every 4 hours",
            "ICU consultation",
            "Consider delivery if still antepartum",
            "Strict I&O and daily weights",
        ],
        (Sepsis, Low) => &[
            "Routine postpartum infection surveillance",
            "Monitor temperature every 8 hours",
        ],
        (Sepsis, Moderate) => &[
            "Monitor temperature every 4 hours",
            "Monitor for signs of endometritis (uterine tenderness, lochia)",
            "Review CBC and differential",
            "Low threshold for blood cultures if febrile",
        ],
        (Sepsis, High) => &[
            "Blood cultures before any antibiotic administration",
            "Broad-spectrum antibiotics within 1 hour if sepsis suspected",
            "Serial vital signs every 2 hours",
            "Lactate level monitoring",
            "Consider CT imaging if source unclear",
            "Infectious disease consultation",
        ],
        (Sepsis, Critical) => &[
            "ACTIVATE Sepsis Bundle protocol",
            "Blood cultures x2 STAT",
            "Broad-spectrum IV antibiotics within 1 hour",
            "30 mL/kg IV crystalloid bolus",
            "Continuous vital sign monitoring",
            "Serial lactate levels q2h",
            "ICU admission for vasopressor support if needed",
            "Source control: imaging and surgical consultation",
        ],
        (Cardiomyopathy, Low) => &[
            "Routine postpartum cardiac assessment",
            "Educate on symptoms: dyspnea, edema, palpitations",
        ],
        (Cardiomyopathy, Moderate) => &[
            "Echocardiogram within 48 hours postpartum",
            "BNP or NT-proBNP level",
            "Daily weight and fluid balance monitoring",
            "Cardiology consultation recommended",
        ],
        (Cardiomyopathy, High) => &[
            "STAT echocardiogram",
            "BNP, troponin, and CRP levels",
            "Cardiology consultation",
            "Continuous telemetry monitoring",
            "Restrict IV fluids to avoid volume overload",
            "Consider ACE inhibitor initiation if not breastfeeding",
        ],
        (Cardiomyopathy, Critical) => &[
            "STAT echocardiogram and cardiology consult",
            "ICU admission for hemodynamic monitoring",
            "BNP, troponin, CRP, full metabolic panel",
            "Diuresis for volume overload",
            "Inotropic support if EF severely reduced",
            "Evaluate for mechanical circulatory support",
            "Lactation team consultation re: medication safety",
        ],
        (Depression, Low) => &[
            "Edinburgh Postnatal Depression Scale at 2-week follow-up",
            "Provide postpartum mental health resource information",
        ],
        (Depression, Moderate) => &[
            "Edinburgh Postnatal Depression Scale before discharge",
            "Schedule early postpartum follow-up at 1-2 weeks",
            "Provide crisis hotline information",
            "Screen for social support and resources",
            "Consider referral to social work",
        ],
        (Depression, High) => &[
            "Psychiatric or psychology consultation before discharge",
            "Edinburgh Postnatal Depression Scale at discharge",
            "Safety assessment including suicidal ideation screening",
            "Establish outpatient mental health follow-up within 1 week",
            "Consider SSRI initiation with lactation guidance",
            "Social work consultation for support services",
        ],
        (Depression, Critical) => &[
            "IMMEDIATE psychiatric consultation",
            "Comprehensive safety assessment including SI/HI",
            "Consider inpatient psychiatric observation",
            "1:1 monitoring if suicidal/homicidal ideation present",
            "Initiate pharmacotherapy with lactation-safe agent",
            "Coordinate intensive outpatient program on discharge",
            "Involve social work for child protective coordination",
        ],
    }
}

/// Recommendations by condition key; unknown keys have none.
#[must_use]
pub fn recommendations_for_key(condition_key: &str, category: RiskCategory) -> Vec<String> {
    Condition::from_key(condition_key)
        .map(|condition| {
            recommendations(condition, category)
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// One-paragraph narrative for a condition result.
///
/// Deterministic in its inputs: the category adjective, the probability as a
/// one-decimal percentage, up to two risk-increasing factors, and the
/// category's action clause.
#[must_use]
pub fn clinical_summary(
    condition_name: &str,
    probability: f64,
    category: RiskCategory,
    top_factors: &[FeatureImpact],
) -> String {
    let percent = probability * 100.0;

    let increasing: Vec<&str> = top_factors
        .iter()
        .filter(|f| f.direction == Direction::IncreasesRisk)
        .take(SUMMARY_FACTOR_LIMIT)
        .map(|f| f.display_name.as_str())
        .collect();

    let factor_sentence = if increasing.is_empty() {
        String::new()
    } else {
        format!(" Key contributing factors include {}.", increasing.join(" and "))
    };

    format!(
        "This patient's predicted risk for {condition_name} is {} at {percent:.1}%.{factor_sentence} {}",
        category.adjective(),
        category.action_clause()
    )
}

/// Recommendations and summary for one condition.
#[must_use]
pub fn generate(
    condition: Condition,
    probability: f64,
    category: RiskCategory,
    top_factors: &[FeatureImpact],
) -> (Vec<String>, String) {
    let recs = recommendations_for_key(condition.key(), category);
    let summary = clinical_summary(condition.display_name(), probability, category, top_factors);
    (recs, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::FeatureValue;
    use crate::domain::risk::MagnitudeBand;

    fn factor(name: &str, contribution: f64) -> FeatureImpact {
        FeatureImpact {
            display_name: name.to_string(),
            feature_key: name.to_lowercase(),
            raw_value: FeatureValue::Integer(1),
            direction: Direction::of(contribution),
            magnitude_band: MagnitudeBand::of(contribution),
            contribution_score: contribution,
            explanation_text: String::new(),
            condition: None,
        }
    }

    #[test]
    fn test_every_condition_has_four_tiers() {
        for condition in Condition::ALL {
            for category in RiskCategory::ALL {
                assert!(
                    !recommendations(condition, category).is_empty(),
                    "{condition} {category}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_condition_has_no_recommendations() {
        assert!(recommendations_for_key("stroke_outcome", RiskCategory::High).is_empty());
        assert_eq!(
            recommendations_for_key("sepsis_outcome", RiskCategory::Critical)[0],
            "ACTIVATE Sepsis Bundle protocol"
        );
    }

    #[test]
    fn test_summary_names_first_two_increasing_factors() {
        let factors = vec![
            factor("Hemoglobin", -0.9),
            factor("Previous PPH History", 0.8),
            factor("Estimated Blood Loss", 0.5),
            factor("Placenta Previa", 0.4),
        ];
        let summary = clinical_summary("Postpartum Hemorrhage", 0.6543, RiskCategory::High, &factors);
        assert_eq!(
            summary,
            "This patient's predicted risk for Postpartum Hemorrhage is elevated at 65.4%. \
             Key contributing factors include Previous PPH History and Estimated Blood Loss. \
             Close monitoring and proactive clinical measures are strongly recommended."
        );
    }

    #[test]
    fn test_summary_without_increasing_factors() {
        let factors = vec![factor("Hemoglobin", -0.2)];
        let summary = clinical_summary("Postpartum Sepsis", 0.05, RiskCategory::Low, &factors);
        assert_eq!(
            summary,
            "This patient's predicted risk for Postpartum Sepsis is low at 5.0%. \
             Standard postpartum monitoring protocols are appropriate."
        );
    }

    #[test]
    fn test_generate_pairs_table_and_summary() {
        let (recs, summary) = generate(Condition::Depression, 0.9, RiskCategory::Critical, &[]);
        assert_eq!(recs.len(), 7);
        assert!(summary.contains("critically elevated at 90.0%"));
    }
}
