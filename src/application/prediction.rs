//! Prediction service: Orchestrates scoring and explanation for all conditions.
//!
//! This service coordinates, per request:
//! - Default resolution and encoding of the patient record
//! - Per-condition scoring and attribution (fanned out over rayon)
//! - Recommendation and summary generation
//! - Cross-condition aggregation

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use super::aggregate::{aggregate, ConditionOutcome};
use super::normalizer::FeatureLayout;
use super::ranker::{rank_all, TOP_FACTORS_PER_CONDITION};
use super::scorer::score;
use crate::adapters::{ArtifactError, DirectoryArtifactStore};
use crate::config::EngineConfig;
use crate::domain::{
    guidance, round_score, Condition, ConditionResult, EncodedFeatureVector, FeatureCatalog,
    PatientRecord, PredictionReport,
};
use crate::ports::{ArtifactStore, ConditionModel, ModelArtifacts, ScoringError};
use crate::{Result, RiskEngineError};

/// Loaded models and encoders. Built once, never mutated.
struct ModelRegistry {
    catalog: &'static FeatureCatalog,
    layout: FeatureLayout,
    /// One model per condition, in declaration order.
    models: Vec<ConditionModel>,
    created_at: Option<DateTime<Utc>>,
}

/// Snapshot of what the service has loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub models_loaded: bool,
    pub conditions: Vec<String>,
    pub feature_count: usize,
    pub artifacts_created_at: Option<DateTime<Utc>>,
}

/// Service for scoring patient records against every condition model.
///
/// Cheap to clone; clones share the same read-only registry, so concurrent
/// requests need no coordination.
#[derive(Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    parallel: bool,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("conditions", &self.registry.models.len())
            .field("features", &self.registry.layout.len())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl PredictionService {
    /// Build the service from loaded artifacts.
    ///
    /// # Errors
    /// Returns `RiskEngineError::Integrity` if the feature order or codebook
    /// disagrees with the catalog, or a condition has no model or two.
    pub fn new(artifacts: ModelArtifacts) -> Result<Self> {
        let catalog = FeatureCatalog::standard();
        let layout = FeatureLayout::new(artifacts.feature_order, &artifacts.codebook, catalog)?;

        let mut models = Vec::with_capacity(Condition::ALL.len());
        for condition in Condition::ALL {
            let mut matching = artifacts.models.iter().filter(|m| m.condition == condition);
            let model = matching.next().ok_or_else(|| {
                RiskEngineError::Integrity(format!("no model loaded for {condition}"))
            })?;
            if matching.next().is_some() {
                return Err(RiskEngineError::Integrity(format!(
                    "more than one model loaded for {condition}"
                )));
            }
            models.push(model.clone());
        }

        tracing::info!(
            "Prediction service ready: {} conditions, {} features",
            models.len(),
            layout.len()
        );

        Ok(Self {
            registry: Arc::new(ModelRegistry {
                catalog,
                layout,
                models,
                created_at: artifacts.created_at,
            }),
            parallel: true,
        })
    }

    /// Load artifacts from a store and build the service.
    ///
    /// # Errors
    /// Returns `RiskEngineError::Artifact` if loading fails, or
    /// `RiskEngineError::Integrity` as for [`PredictionService::new`].
    pub fn from_store<S>(store: &S) -> Result<Self>
    where
        S: ArtifactStore,
        S::Error: Into<ArtifactError>,
    {
        let artifacts = store
            .load()
            .map_err(|e| RiskEngineError::Artifact(e.into()))?;
        Self::new(artifacts)
    }

    /// Load from the configured model directory.
    ///
    /// # Errors
    /// Same as [`PredictionService::from_store`].
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let store = DirectoryArtifactStore::new(&config.model_dir)
            .allow_unsealed(config.allow_unsealed_models);
        Ok(Self::from_store(&store)?.with_parallel(config.parallel_conditions))
    }

    /// Score conditions concurrently (default) or one after another.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn feature_order(&self) -> &[String] {
        self.registry.layout.feature_order()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            models_loaded: !self.registry.models.is_empty(),
            conditions: self
                .registry
                .models
                .iter()
                .map(|m| m.condition.key().to_string())
                .collect(),
            feature_count: self.registry.layout.len(),
            artifacts_created_at: self.registry.created_at,
        }
    }

    /// Resolve defaults and encode a record as the models see it.
    ///
    /// # Errors
    /// Returns `RiskEngineError::Validation` if a value has the wrong kind.
    pub fn encode(&self, record: &PatientRecord) -> Result<EncodedFeatureVector> {
        let resolved = self.resolve(record)?;
        Ok(self.registry.layout.normalize(&resolved))
    }

    fn resolve(&self, record: &PatientRecord) -> Result<PatientRecord> {
        record
            .with_defaults(self.registry.catalog)
            .map_err(|errors| RiskEngineError::Validation(errors.join("; ")))
    }

    /// Score, explain, and aggregate a patient record across all conditions.
    ///
    /// All-or-nothing: if any condition's collaborator fails, no report is
    /// produced.
    ///
    /// # Errors
    /// Returns `RiskEngineError::Validation` for mistyped values, or
    /// `RiskEngineError::Scoring` naming the first failing condition.
    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionReport> {
        let started = Instant::now();

        let resolved = self.resolve(record)?;
        let vector = self.registry.layout.normalize(&resolved);

        let models = &self.registry.models;
        let outcomes: Vec<ConditionOutcome> = if self.parallel {
            models
                .par_iter()
                .map(|model| self.evaluate(model, &vector, &resolved))
                .collect::<Result<_>>()?
        } else {
            models
                .iter()
                .map(|model| self.evaluate(model, &vector, &resolved))
                .collect::<Result<_>>()?
        };

        let report = aggregate(outcomes);

        tracing::info!(
            "Prediction complete: overall={} score={:.4} global_factors={} elapsed={:?}",
            report.overall_risk_category,
            report.overall_risk_score,
            report.global_top_factors.len(),
            started.elapsed()
        );

        Ok(report)
    }

    fn evaluate(
        &self,
        model: &ConditionModel,
        vector: &EncodedFeatureVector,
        raw: &PatientRecord,
    ) -> Result<ConditionOutcome> {
        let condition = model.condition;
        let failed = |source: ScoringError| {
            tracing::warn!("Scoring failed for {}: {}", condition, source);
            RiskEngineError::Scoring {
                condition: condition.key().to_string(),
                source,
            }
        };

        let (probability, category) = score(vector, model.classifier.as_ref()).map_err(failed)?;
        let all_factors = rank_all(
            vector,
            raw,
            model.explainer.as_ref(),
            self.registry.layout.feature_order(),
            self.registry.catalog,
        )
        .map_err(failed)?;

        let top_factors: Vec<_> = all_factors
            .iter()
            .take(TOP_FACTORS_PER_CONDITION)
            .cloned()
            .collect();
        let (recommendations, clinical_summary) =
            guidance::generate(condition, probability, category, &top_factors);

        tracing::debug!(
            "Scored {}: {:.4} ({}), {} factors",
            condition,
            probability,
            category,
            all_factors.len()
        );

        Ok(ConditionOutcome {
            result: ConditionResult {
                display_name: condition.display_name().to_string(),
                condition_key: condition.key().to_string(),
                risk_score: round_score(probability),
                risk_category: category,
                top_factors,
                recommendations,
                clinical_summary,
            },
            all_factors,
        })
    }
}
