//! # postpartum-risk
//!
//! Multi-condition postpartum risk scoring with per-feature explanations.
//!
//! One patient record is scored against five independent binary models
//! (hemorrhage, preeclampsia, sepsis, cardiomyopathy, depression). Each score
//! is explained by signed per-feature attributions, and the results are folded
//! into a single report with an overall risk level, deduplicated global
//! factors, recommendation lists, and narrative summaries.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (feature catalog, patient record, risk categories, report)
//! - `ports`: Traits for the trained collaborators and the artifact store
//! - `adapters`: Logistic model export, manifest-verified model directory, log sanitizer
//! - `application`: The prediction pipeline and `PredictionService`
//! - `config`: Environment-driven runtime settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{EngineStatus, PredictionService};
pub use config::EngineConfig;
pub use domain::{Condition, PatientRecord, PredictionReport, RiskCategory};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, RiskEngineError>;

/// Main error type for the risk engine
#[derive(Debug, thiserror::Error)]
pub enum RiskEngineError {
    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Artifact integrity check failed: {0}")]
    Integrity(String),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Scoring failed for {condition}: {source}")]
    Scoring {
        condition: String,
        #[source]
        source: ports::ScoringError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
