//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: exported logistic regression models (classifier and explainer)
//! - `directory`: manifest-verified artifact directory
//! - `sanitize`: identifier filtering for logs

pub mod directory;
pub mod logistic;
pub mod sanitize;

pub use directory::{ArtifactError, ArtifactManifest, DirectoryArtifactStore};
pub use logistic::{ExportedLogisticModel, LogisticModel};
