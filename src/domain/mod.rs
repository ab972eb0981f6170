//! Domain layer: Core types for postpartum risk reporting.
//!
//! Pure data and pure functions: the feature catalog, patient records, risk
//! categories, the condition table, report types, and clinical guidance.
//! Nothing here performs I/O or calls a model.

pub mod catalog;
mod condition;
mod encoded;
pub mod guidance;
mod patient;
mod report;
mod risk;

pub use catalog::{FeatureCatalog, FeatureGroup, FeatureSpec, GENERIC_EXPLANATION};
pub use condition::Condition;
pub use encoded::EncodedFeatureVector;
pub use patient::{FeatureValue, PatientRecord};
pub use report::{round_score, ConditionResult, FeatureImpact, PredictionReport};
pub use risk::{Direction, MagnitudeBand, RiskCategory};
