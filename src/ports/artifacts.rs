//! Artifact store port: Trait for loading trained model artifacts.
//!
//! Loading happens once, before any request is served. Every artifact is
//! required; a store that cannot produce all of them must fail.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::Condition;

use super::{Classifier, Explainer};

/// Categorical value to trained integer code, per categorical feature.
pub type Codebook = BTreeMap<String, BTreeMap<String, i64>>;

/// The trained collaborators for a single condition.
#[derive(Clone)]
pub struct ConditionModel {
    pub condition: Condition,
    pub classifier: Arc<dyn Classifier>,
    pub explainer: Arc<dyn Explainer>,
}

impl std::fmt::Debug for ConditionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionModel")
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

/// Everything the engine needs from training.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Trained feature order shared by every classifier and explainer.
    pub feature_order: Vec<String>,
    pub codebook: Codebook,
    /// One entry per condition.
    pub models: Vec<ConditionModel>,
    /// When the artifact set was sealed, if recorded.
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Trait for loading model artifacts at startup.
pub trait ArtifactStore: Send + Sync {
    /// Error type for load failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the feature order, codebook, and all condition models.
    ///
    /// # Errors
    /// Returns error if any artifact is absent, unreadable, or inconsistent.
    fn load(&self) -> Result<ModelArtifacts, Self::Error>;
}
