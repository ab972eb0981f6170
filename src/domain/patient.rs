//! Patient record types for postpartum risk prediction.
//!
//! A record maps feature keys to raw values as they arrive on the request.
//! Every feature is optional; unset features take their Feature Catalog
//! defaults before the record reaches the normalizer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::FeatureCatalog;

/// A raw feature value: integer, real, or categorical text.
///
/// Deserialized untagged so `28` stays an integer and `28.5` a real; the
/// original representation is echoed back in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value, `None` for text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Raw patient input: feature key to value, any subset of features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl PatientRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Produce the fully populated record the request schema describes.
    ///
    /// Unset catalog features take their defaults. Keys the catalog does not
    /// know are dropped. A value of the wrong kind (text for a numeric
    /// feature, a number for a categorical one) is a validation error.
    ///
    /// # Errors
    /// Returns one message per mismatched feature.
    pub fn with_defaults(&self, catalog: &FeatureCatalog) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        let mut values = BTreeMap::new();

        for spec in catalog.iter() {
            match self.values.get(spec.key) {
                Some(value) if spec.is_categorical && value.is_numeric() => {
                    errors.push(format!("{} must be text, got {value}", spec.key));
                }
                Some(FeatureValue::Text(_)) if !spec.is_categorical => {
                    errors.push(format!("{} must be numeric", spec.key));
                }
                Some(value) => {
                    values.insert(spec.key.to_string(), value.clone());
                }
                None => {
                    values.insert(spec.key.to_string(), spec.default.to_value());
                }
            }
        }

        let unknown = self.keys().filter(|k| !catalog.contains(k)).count();
        if unknown > 0 {
            tracing::warn!("Ignoring {} feature(s) not in the catalog", unknown);
        }

        if errors.is_empty() {
            Ok(Self { values })
        } else {
            Err(errors)
        }
    }
}

impl FromIterator<(String, FeatureValue)> for PatientRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
