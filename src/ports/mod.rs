//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the engine and the trained models it consumes.

mod artifacts;
mod scoring;

pub use artifacts::{ArtifactStore, Codebook, ConditionModel, ModelArtifacts};
pub use scoring::{Classifier, Explainer, ScoringError};
