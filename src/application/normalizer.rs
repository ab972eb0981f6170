//! Input normalization: patient record to encoded feature vector.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{EncodedFeatureVector, FeatureCatalog, FeatureValue, PatientRecord};
use crate::ports::Codebook;
use crate::RiskEngineError;

/// Encoding used when a feature is absent or a category was never trained on.
pub const FALLBACK_CODE: f64 = 0.0;

/// How one slot of the feature vector is filled.
#[derive(Debug, Clone)]
enum Slot {
    Numeric,
    Categorical(BTreeMap<String, i64>),
}

/// The trained feature order with its encoders, checked once against the catalog.
///
/// Construction is the only place a catalog/order/codebook disagreement is
/// detected. After that, [`FeatureLayout::normalize`] cannot fail and always
/// returns a vector of [`FeatureLayout::len`] values.
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    order: Vec<String>,
    slots: Vec<Slot>,
}

impl FeatureLayout {
    /// Validate the trained order and codebook against the catalog.
    ///
    /// # Errors
    /// Returns `RiskEngineError::Integrity` if the order has duplicates or
    /// differs from the catalog's feature set, if the codebook encodes a
    /// numeric or unknown feature, or if a categorical feature has no codebook.
    pub fn new(
        feature_order: Vec<String>,
        codebook: &Codebook,
        catalog: &FeatureCatalog,
    ) -> Result<Self, RiskEngineError> {
        let mut seen = HashSet::with_capacity(feature_order.len());
        for key in &feature_order {
            if !seen.insert(key.as_str()) {
                return Err(RiskEngineError::Integrity(format!(
                    "feature order lists {key} twice"
                )));
            }
            if !catalog.contains(key) {
                return Err(RiskEngineError::Integrity(format!(
                    "feature order has {key}, which the catalog does not define"
                )));
            }
        }

        let missing: Vec<&str> = catalog
            .iter()
            .map(|spec| spec.key)
            .filter(|key| !seen.contains(key))
            .collect();
        if !missing.is_empty() {
            return Err(RiskEngineError::Integrity(format!(
                "feature order is missing catalog features: {}",
                missing.join(", ")
            )));
        }

        for key in codebook.keys() {
            match catalog.get(key) {
                Some(spec) if spec.is_categorical => {}
                _ => {
                    return Err(RiskEngineError::Integrity(format!(
                        "codebook encodes {key}, which is not a categorical feature"
                    )))
                }
            }
        }

        if let Some(key) = catalog
            .categorical_keys()
            .find(|key| codebook.get(*key).map_or(true, BTreeMap::is_empty))
        {
            return Err(RiskEngineError::Integrity(format!(
                "no codebook for categorical feature {key}"
            )));
        }

        let slots = feature_order
            .iter()
            .map(|key| match codebook.get(key) {
                Some(codes) => Slot::Categorical(codes.clone()),
                None => Slot::Numeric,
            })
            .collect();

        Ok(Self {
            order: feature_order,
            slots,
        })
    }

    #[must_use]
    pub fn feature_order(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Encode a record in trained feature order.
    ///
    /// Absent features and unseen categories encode as [`FALLBACK_CODE`].
    /// Both are silent degradations, not errors.
    #[must_use]
    pub fn normalize(&self, record: &PatientRecord) -> EncodedFeatureVector {
        let values = self
            .order
            .iter()
            .zip(&self.slots)
            .map(|(key, slot)| match (record.get(key), slot) {
                (None, _) => FALLBACK_CODE,
                (Some(value), Slot::Numeric) => value.as_f64().unwrap_or_else(|| {
                    tracing::warn!(feature = %key, "Non-numeric value, encoding as 0");
                    FALLBACK_CODE
                }),
                (Some(value), Slot::Categorical(codes)) => encode_category(key, value, codes),
            })
            .collect();

        EncodedFeatureVector::new(values)
    }
}

fn encode_category(key: &str, value: &FeatureValue, codes: &BTreeMap<String, i64>) -> f64 {
    match value.as_text().and_then(|text| codes.get(text)) {
        Some(&code) => code as f64,
        None => {
            tracing::warn!(feature = %key, "Unrecognized category, encoding as 0");
            FALLBACK_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_codebook() -> Codebook {
        let mut codebook = Codebook::new();
        codebook.insert(
            "race_ethnicity".into(),
            ["Asian", "Black", "Hispanic", "Native American", "Other", "White"]
                .iter()
                .enumerate()
                .map(|(i, v)| ((*v).to_string(), i as i64))
                .collect(),
        );
        codebook.insert(
            "insurance_type".into(),
            ["Medicaid", "Medicare", "Private", "Uninsured"]
                .iter()
                .enumerate()
                .map(|(i, v)| ((*v).to_string(), i as i64))
                .collect(),
        );
        codebook.insert(
            "mode_of_delivery".into(),
            ["Assisted Vaginal", "Cesarean", "Vaginal"]
                .iter()
                .enumerate()
                .map(|(i, v)| ((*v).to_string(), i as i64))
                .collect(),
        );
        codebook
    }

    fn standard_order() -> Vec<String> {
        FeatureCatalog::standard()
            .iter()
            .map(|spec| spec.key.to_string())
            .collect()
    }

    fn layout() -> FeatureLayout {
        FeatureLayout::new(standard_order(), &standard_codebook(), FeatureCatalog::standard())
            .expect("Standard layout should validate")
    }

    fn index_of(layout: &FeatureLayout, key: &str) -> usize {
        layout
            .feature_order()
            .iter()
            .position(|k| k == key)
            .expect("Key should be in order")
    }

    #[test]
    fn test_empty_record_encodes_to_zeros() {
        let layout = layout();
        let vector = layout.normalize(&PatientRecord::new());
        assert_eq!(vector.len(), layout.len());
        assert!(vector.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_values_land_in_trained_order() {
        let layout = layout();
        let record = PatientRecord::new()
            .with("estimated_blood_loss_ml", 1200)
            .with("hemoglobin", 9.5)
            .with("mode_of_delivery", "Cesarean")
            .with("race_ethnicity", "White");

        let vector = layout.normalize(&record);
        assert_eq!(vector.get(index_of(&layout, "estimated_blood_loss_ml")), Some(1200.0));
        assert_eq!(vector.get(index_of(&layout, "hemoglobin")), Some(9.5));
        assert_eq!(vector.get(index_of(&layout, "mode_of_delivery")), Some(1.0));
        assert_eq!(vector.get(index_of(&layout, "race_ethnicity")), Some(5.0));
    }

    #[test]
    fn test_unseen_category_falls_back_to_zero() {
        let layout = layout();
        let record = PatientRecord::new().with("race_ethnicity", "Unknown_Code");
        let vector = layout.normalize(&record);
        assert_eq!(vector.get(index_of(&layout, "race_ethnicity")), Some(FALLBACK_CODE));
    }

    #[test]
    fn test_rejects_order_missing_a_feature() {
        let mut order = standard_order();
        order.retain(|k| k != "hemoglobin");
        let err = FeatureLayout::new(order, &standard_codebook(), FeatureCatalog::standard())
            .expect_err("Must fail");
        assert!(err.to_string().contains("hemoglobin"));
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_keys() {
        let mut order = standard_order();
        order.push("age".into());
        assert!(FeatureLayout::new(order, &standard_codebook(), FeatureCatalog::standard()).is_err());

        let mut order = standard_order();
        order[0] = "shoe_size".into();
        assert!(FeatureLayout::new(order, &standard_codebook(), FeatureCatalog::standard()).is_err());
    }

    #[test]
    fn test_rejects_codebook_mismatch() {
        let mut codebook = standard_codebook();
        codebook.remove("insurance_type");
        assert!(FeatureLayout::new(standard_order(), &codebook, FeatureCatalog::standard()).is_err());

        let mut codebook = standard_codebook();
        codebook.insert("age".into(), BTreeMap::new());
        assert!(FeatureLayout::new(standard_order(), &codebook, FeatureCatalog::standard()).is_err());

        let mut codebook = standard_codebook();
        codebook.insert("mode_of_delivery".into(), BTreeMap::new());
        let err = FeatureLayout::new(standard_order(), &codebook, FeatureCatalog::standard())
            .expect_err("Empty codebook must fail");
        assert!(err.to_string().contains("mode_of_delivery"));
    }
}
