//! Feature Catalog: static metadata for every patient feature the models know.
//!
//! One entry per feature, in the order the request schema declares them. The
//! catalog is process-wide and immutable; it is used for default values,
//! categorical encoding decisions, and the display text attached to each
//! ranked factor.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use super::patient::FeatureValue;

/// Clinical grouping of a feature, mirroring the sections of the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Demographics,
    Obstetric,
    Vitals,
    Labs,
    MedicalHistory,
    Delivery,
    Social,
}

/// Default value of a feature when the patient record leaves it unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Real(f64),
    Text(&'static str),
}

impl DefaultValue {
    /// Materialize the default as an owned feature value.
    #[must_use]
    pub fn to_value(self) -> FeatureValue {
        match self {
            Self::Int(v) => FeatureValue::Integer(v),
            Self::Real(v) => FeatureValue::Real(v),
            Self::Text(v) => FeatureValue::Text(v.to_string()),
        }
    }
}

/// Metadata for a single feature.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub key: &'static str,
    pub display_name: &'static str,
    /// Clinical rationale shown next to the factor.
    pub context: &'static str,
    pub is_categorical: bool,
    pub group: FeatureGroup,
    pub default: DefaultValue,
}

/// Explanation used when a ranked feature has no catalog entry.
pub const GENERIC_EXPLANATION: &str = "This feature contributes to the risk prediction.";

macro_rules! numeric {
    ($key:literal, $display:literal, $group:ident, $default:expr, $context:literal) => {
        FeatureSpec {
            key: $key,
            display_name: $display,
            context: $context,
            is_categorical: false,
            group: FeatureGroup::$group,
            default: $default,
        }
    };
}

macro_rules! categorical {
    ($key:literal, $display:literal, $group:ident, $default:literal, $context:literal) => {
        FeatureSpec {
            key: $key,
            display_name: $display,
            context: $context,
            is_categorical: true,
            group: FeatureGroup::$group,
            default: DefaultValue::Text($default),
        }
    };
}

use DefaultValue::{Int, Real};

static FEATURES: [FeatureSpec; 45] = [
    // Demographics
    numeric!("age", "Patient Age", Demographics, Int(28),
        "Advanced maternal age (>35) is associated with increased risk for several postpartum complications."),
    categorical!("race_ethnicity", "Race/Ethnicity", Demographics, "White",
        "Racial disparities in maternal outcomes reflect systemic healthcare inequities and social determinants of health."),
    categorical!("insurance_type", "Insurance Type", Demographics, "Private",
        "Insurance status affects access to prenatal care and postpartum follow-up."),
    numeric!("bmi_pre_pregnancy", "Pre-pregnancy BMI", Demographics, Real(25.0),
        "Elevated BMI increases risk for hypertensive disorders, hemorrhage, and surgical complications."),
    // Obstetric
    numeric!("gravidity", "Number of Pregnancies", Obstetric, Int(1),
        "Grand multigravidity is associated with increased uterine atony and hemorrhage risk."),
    numeric!("parity", "Number of Prior Births", Obstetric, Int(0),
        "Parity influences uterine tone and risk for postpartum complications."),
    numeric!("previous_cesarean", "Previous Cesarean Section", Obstetric, Int(0),
        "Prior cesarean increases risk of surgical complications, placental abnormalities, and hemorrhage."),
    numeric!("previous_pph", "Previous PPH History", Obstetric, Int(0),
        "History of previous PPH significantly increases recurrence risk in subsequent deliveries."),
    numeric!("previous_preeclampsia", "Previous Preeclampsia", Obstetric, Int(0),
        "Prior preeclampsia is the strongest predictor of recurrence in future pregnancies."),
    numeric!("gestational_age_at_delivery", "Gestational Age at Delivery", Obstetric, Int(39),
        "Preterm delivery (<37 weeks) is associated with increased infection risk and maternal complications."),
    numeric!("multiple_gestation", "Multiple Gestation (Twins+)", Obstetric, Int(0),
        "Multiple gestation increases risk of hemorrhage, preeclampsia, and cardiomyopathy."),
    categorical!("mode_of_delivery", "Mode of Delivery", Obstetric, "Vaginal",
        "Cesarean delivery carries higher risk of hemorrhage, infection, and thromboembolic events."),
    // Vitals
    numeric!("systolic_bp", "Systolic Blood Pressure", Vitals, Int(120),
        "Elevated systolic BP (>140 mmHg) may indicate preeclampsia or hypertensive emergency."),
    numeric!("diastolic_bp", "Diastolic Blood Pressure", Vitals, Int(75),
        "Diastolic BP >90 mmHg is a key diagnostic criterion for hypertensive disorders."),
    numeric!("heart_rate", "Heart Rate", Vitals, Int(80),
        "Tachycardia may indicate hemorrhage, sepsis, or cardiac dysfunction."),
    numeric!("temperature", "Temperature (°F)", Vitals, Real(98.6),
        "Fever >100.4°F in the postpartum period raises concern for endometritis or sepsis."),
    numeric!("respiratory_rate", "Respiratory Rate", Vitals, Int(18),
        "Tachypnea may indicate pulmonary edema, sepsis, or cardiovascular compromise."),
    // Labs
    numeric!("hemoglobin", "Hemoglobin (g/dL)", Labs, Real(12.0),
        "Low hemoglobin indicates anemia and increases vulnerability to hemorrhage-related morbidity."),
    numeric!("platelet_count", "Platelet Count (×10³/µL)", Labs, Int(250),
        "Thrombocytopenia (<150K) may indicate HELLP syndrome or DIC."),
    numeric!("white_blood_cell_count", "WBC Count (×10³/µL)", Labs, Real(10.0),
        "Elevated WBC (>15K) may indicate infection, though mild leukocytosis is normal postpartum."),
    numeric!("creatinine", "Creatinine (mg/dL)", Labs, Real(0.8),
        "Elevated creatinine suggests renal impairment, which may complicate preeclampsia."),
    numeric!("ast_level", "AST Level (U/L)", Labs, Int(25),
        "Elevated AST may indicate liver dysfunction associated with HELLP syndrome."),
    numeric!("alt_level", "ALT Level (U/L)", Labs, Int(22),
        "Elevated ALT suggests hepatic injury, often seen in severe preeclampsia."),
    numeric!("blood_glucose", "Blood Glucose (mg/dL)", Labs, Int(100),
        "Abnormal glucose levels indicate diabetes, a risk factor for infection and preeclampsia."),
    // Medical history
    numeric!("chronic_hypertension", "Chronic Hypertension", MedicalHistory, Int(0),
        "Pre-existing hypertension significantly increases risk of superimposed preeclampsia."),
    numeric!("pregestational_diabetes", "Pre-gestational Diabetes", MedicalHistory, Int(0),
        "Pre-existing diabetes increases risk of preeclampsia, infection, and cardiomyopathy."),
    numeric!("gestational_diabetes", "Gestational Diabetes", MedicalHistory, Int(0),
        "Gestational diabetes is associated with macrosomia and increased cesarean delivery risk."),
    numeric!("anemia_during_pregnancy", "Anemia During Pregnancy", MedicalHistory, Int(0),
        "Antepartum anemia reduces physiologic reserve for blood loss during delivery."),
    numeric!("uterine_fibroids", "Uterine Fibroids", MedicalHistory, Int(0),
        "Fibroids can impair uterine contraction, increasing hemorrhage risk."),
    numeric!("placenta_previa", "Placenta Previa", MedicalHistory, Int(0),
        "Placenta previa is a major risk factor for antepartum and postpartum hemorrhage."),
    numeric!("placental_abruption", "Placental Abruption", MedicalHistory, Int(0),
        "Abruption causes severe hemorrhage and may lead to DIC and coagulopathy."),
    numeric!("chorioamnionitis", "Chorioamnionitis", MedicalHistory, Int(0),
        "Intra-amniotic infection is a leading risk factor for postpartum endometritis and sepsis."),
    numeric!("autoimmune_disorder", "Autoimmune Disorder", MedicalHistory, Int(0),
        "Autoimmune conditions increase risk of preeclampsia and thrombotic complications."),
    // Delivery
    numeric!("labor_induction", "Labor Induction", Delivery, Int(0),
        "Induced labor may be prolonged and is associated with increased intervention rates."),
    numeric!("labor_augmentation_oxytocin", "Oxytocin Augmentation", Delivery, Int(0),
        "Oxytocin use during labor can cause uterine atony after delivery, increasing hemorrhage risk."),
    numeric!("epidural_anesthesia", "Epidural Anesthesia", Delivery, Int(0),
        "Epidural use may prolong labor and increase need for instrumental delivery."),
    numeric!("general_anesthesia", "General Anesthesia", Delivery, Int(0),
        "General anesthesia carries higher risk of aspiration, hemorrhage, and delayed bonding."),
    numeric!("perineal_laceration_degree", "Perineal Laceration Degree", Delivery, Int(0),
        "Severe lacerations (3rd-4th degree) increase blood loss and infection risk."),
    numeric!("estimated_blood_loss_ml", "Estimated Blood Loss (mL)", Delivery, Int(350),
        "EBL >500mL (vaginal) or >1000mL (cesarean) defines postpartum hemorrhage."),
    numeric!("newborn_weight_g", "Newborn Weight (g)", Delivery, Int(3300),
        "Macrosomia (>4000g) increases risk of lacerations and uterine atony."),
    numeric!("labor_duration_hours", "Labor Duration (hours)", Delivery, Real(10.0),
        "Prolonged labor increases risk of infection, hemorrhage, and maternal exhaustion."),
    // Social
    numeric!("smoking_during_pregnancy", "Smoking During Pregnancy", Social, Int(0),
        "Smoking impairs wound healing and is associated with placental complications."),
    numeric!("substance_use", "Substance Use", Social, Int(0),
        "Substance use is associated with preterm birth, poor prenatal care, and postpartum depression."),
    numeric!("prenatal_visits_count", "Number of Prenatal Visits", Social, Int(10),
        "Fewer prenatal visits indicate reduced access to care and missed screening opportunities."),
    numeric!("distance_to_hospital_miles", "Distance to Hospital (miles)", Social, Real(12.0),
        "Greater distance may delay emergency intervention for postpartum complications."),
];

/// Lookup-only view over the static feature metadata.
#[derive(Debug)]
pub struct FeatureCatalog {
    specs: &'static [FeatureSpec],
    index: HashMap<&'static str, usize>,
}

impl FeatureCatalog {
    /// The catalog of every feature accepted on a patient record.
    #[must_use]
    pub fn standard() -> &'static FeatureCatalog {
        static CATALOG: OnceLock<FeatureCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| FeatureCatalog::from_specs(&FEATURES))
    }

    /// Build a catalog over an arbitrary spec table.
    #[must_use]
    pub fn from_specs(specs: &'static [FeatureSpec]) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.key, i))
            .collect();
        Self { specs, index }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FeatureSpec> {
        self.index.get(key).map(|&i| &self.specs[i])
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Features in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.specs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Display name, falling back to the raw key for unknown features.
    #[must_use]
    pub fn display_name<'a>(&self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |spec| spec.display_name)
    }

    /// Clinical context, falling back to [`GENERIC_EXPLANATION`].
    #[must_use]
    pub fn explanation(&self, key: &str) -> &'static str {
        self.get(key).map_or(GENERIC_EXPLANATION, |spec| spec.context)
    }

    /// Keys of the categorical features, in declaration order.
    pub fn categorical_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs
            .iter()
            .filter(|spec| spec.is_categorical)
            .map(|spec| spec.key)
    }
}
