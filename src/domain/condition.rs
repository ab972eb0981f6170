//! The closed set of modeled postpartum conditions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five modeled postpartum outcomes.
///
/// Declaration order is the report order and breaks ties in the overall
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "pph_outcome")]
    Hemorrhage,
    #[serde(rename = "preeclampsia_postpartum")]
    Preeclampsia,
    #[serde(rename = "sepsis_outcome")]
    Sepsis,
    #[serde(rename = "cardiomyopathy_outcome")]
    Cardiomyopathy,
    #[serde(rename = "ppd_outcome")]
    Depression,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Self::Hemorrhage,
        Self::Preeclampsia,
        Self::Sepsis,
        Self::Cardiomyopathy,
        Self::Depression,
    ];

    /// Identifier used for artifacts and in the report.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hemorrhage => "pph_outcome",
            Self::Preeclampsia => "preeclampsia_postpartum",
            Self::Sepsis => "sepsis_outcome",
            Self::Cardiomyopathy => "cardiomyopathy_outcome",
            Self::Depression => "ppd_outcome",
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Hemorrhage => "Postpartum Hemorrhage",
            Self::Preeclampsia => "Postpartum Preeclampsia",
            Self::Sepsis => "Postpartum Sepsis",
            Self::Cardiomyopathy => "Peripartum Cardiomyopathy",
            Self::Depression => "Postpartum Depression",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
