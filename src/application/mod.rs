//! Application layer: The prediction pipeline.
//!
//! Stages run in this order for each request: normalizer, then scorer and
//! ranker per condition, then aggregate. `PredictionService` wires them to
//! the loaded models.

pub mod aggregate;
pub mod normalizer;
mod prediction;
pub mod ranker;
pub mod scorer;

pub use aggregate::{ConditionOutcome, GLOBAL_TOP_FACTORS};
pub use normalizer::{FeatureLayout, FALLBACK_CODE};
pub use prediction::{EngineStatus, PredictionService};
pub use ranker::{NEGLIGIBLE_CONTRIBUTION, TOP_FACTORS_PER_CONDITION};
