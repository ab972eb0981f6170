//! Risk categories and attribution bands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal risk category derived from a probability.
///
/// Variant order is the clinical severity order, so `Ord` compares severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// `[0.0, 0.2)`
    Low,
    /// `[0.2, 0.5)`
    Moderate,
    /// `[0.5, 0.8)`
    High,
    /// `[0.8, 1.0]`
    Critical,
}

impl RiskCategory {
    pub const MODERATE_THRESHOLD: f64 = 0.2;
    pub const HIGH_THRESHOLD: f64 = 0.5;
    pub const CRITICAL_THRESHOLD: f64 = 0.8;

    pub const ALL: [RiskCategory; 4] = [Self::Low, Self::Moderate, Self::High, Self::Critical];

    /// Map a probability onto its category using closed-open intervals.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < Self::MODERATE_THRESHOLD {
            Self::Low
        } else if probability < Self::HIGH_THRESHOLD {
            Self::Moderate
        } else if probability < Self::CRITICAL_THRESHOLD {
            Self::High
        } else {
            Self::Critical
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Adjective used in the narrative summary.
    #[must_use]
    pub fn adjective(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "elevated",
            Self::Critical => "critically elevated",
        }
    }

    /// Closing sentence of the narrative summary.
    #[must_use]
    pub fn action_clause(&self) -> &'static str {
        match self {
            Self::Low => "Standard postpartum monitoring protocols are appropriate.",
            Self::Moderate => "Enhanced monitoring and early intervention planning are recommended.",
            Self::High => {
                "Close monitoring and proactive clinical measures are strongly recommended."
            }
            Self::Critical => {
                "Immediate clinical attention and intensive monitoring protocols are indicated."
            }
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign of a feature's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    IncreasesRisk,
    DecreasesRisk,
}

impl Direction {
    /// Strictly positive contributions increase risk.
    #[must_use]
    pub fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Self::IncreasesRisk
        } else {
            Self::DecreasesRisk
        }
    }
}

/// Magnitude band of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeBand {
    Low,
    Moderate,
    High,
}

impl MagnitudeBand {
    pub const HIGH_ABOVE: f64 = 0.3;
    pub const MODERATE_ABOVE: f64 = 0.1;

    #[must_use]
    pub fn of(contribution: f64) -> Self {
        let magnitude = contribution.abs();
        if magnitude > Self::HIGH_ABOVE {
            Self::High
        } else if magnitude > Self::MODERATE_ABOVE {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}
