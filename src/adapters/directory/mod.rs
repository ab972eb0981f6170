//! Directory adapter: Implementation of ArtifactStore over a model directory.
//!
//! Expected layout:
//!
//! ```text
//! models/
//!   manifest.json                      # SHA-256 of every file below
//!   feature_order.json                 # ["age", "race_ethnicity", ...]
//!   codebook.json                      # {"race_ethnicity": {"Asian": 0, ...}, ...}
//!   <condition_key>_model.json         # one per condition
//! ```
//!
//! # Integrity
//!
//! Every artifact read must be bound by `manifest.json` and match its digest.
//! Debug builds can load an unsealed directory when
//! `POSTPARTUM_ALLOW_UNSEALED_MODELS=true`; release builds never do.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::logistic::{ExportedLogisticModel, LogisticModel};
use crate::domain::Condition;
use crate::ports::{ArtifactStore, Codebook, ConditionModel, ModelArtifacts};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FEATURE_ORDER_FILE: &str = "feature_order.json";
pub const CODEBOOK_FILE: &str = "codebook.json";

const MANIFEST_VERSION: u32 = 1;

/// Artifact loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Missing artifact: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {name}: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact {0} is not bound by manifest.json")]
    Unsealed(String),

    #[error("File hash mismatch for {0}")]
    DigestMismatch(String),

    #[error("Unsupported manifest version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid artifact {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Digest manifest binding an artifact directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// File name to lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Every file a complete artifact directory must contain.
    #[must_use]
    pub fn required_files() -> Vec<String> {
        let mut names = vec![FEATURE_ORDER_FILE.to_string(), CODEBOOK_FILE.to_string()];
        names.extend(Condition::ALL.iter().map(|c| model_file_name(*c)));
        names
    }

    /// Digest the required files in `dir`.
    ///
    /// # Errors
    /// Returns error if any required file is absent or unreadable.
    pub fn seal(dir: &Path, created_at: DateTime<Utc>) -> Result<Self, ArtifactError> {
        let mut files = BTreeMap::new();
        for name in Self::required_files() {
            let bytes = read_bytes(&dir.join(&name))?;
            files.insert(name, sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            created_at: Some(created_at),
            files,
        })
    }

    /// Write as pretty JSON to `dir/manifest.json`.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|source| ArtifactError::Malformed {
            name: MANIFEST_FILE.to_string(),
            source,
        })?;
        bytes.push(b'\n');
        fs::write(&path, bytes).map_err(|source| ArtifactError::Unreadable {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// File name of a condition's exported model.
#[must_use]
pub fn model_file_name(condition: Condition) -> String {
    format!("{}_model.json", condition.key())
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Malformed {
        name: name.to_string(),
        source,
    })
}

/// Loads artifacts from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    dir: PathBuf,
    allow_unsealed: bool,
}

impl DirectoryArtifactStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            allow_unsealed: false,
        }
    }

    /// Permit a directory without `manifest.json`. Ignored in release builds.
    #[must_use]
    pub fn allow_unsealed(mut self, allow: bool) -> Self {
        self.allow_unsealed = allow;
        self
    }

    fn read_manifest(&self) -> Result<Option<ArtifactManifest>, ArtifactError> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.exists() {
            if self.allow_unsealed && cfg!(debug_assertions) {
                tracing::warn!(
                    "Loading UNSEALED model artifacts from {:?}. Debug builds only.",
                    self.dir
                );
                return Ok(None);
            }
            tracing::error!("No {} in {:?}", MANIFEST_FILE, self.dir);
            return Err(ArtifactError::Missing(path));
        }

        let manifest: ArtifactManifest = parse(MANIFEST_FILE, &read_bytes(&path)?)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(ArtifactError::UnsupportedVersion(manifest.version));
        }
        Ok(Some(manifest))
    }

    /// Read one artifact, checking its digest when a manifest is present.
    fn read_artifact(
        &self,
        name: &str,
        manifest: Option<&ArtifactManifest>,
    ) -> Result<Vec<u8>, ArtifactError> {
        let bytes = read_bytes(&self.dir.join(name))?;

        if let Some(manifest) = manifest {
            let expected = manifest
                .files
                .get(name)
                .ok_or_else(|| ArtifactError::Unsealed(name.to_string()))?;
            if !sha256_hex(&bytes).eq_ignore_ascii_case(expected) {
                return Err(ArtifactError::DigestMismatch(name.to_string()));
            }
        }
        Ok(bytes)
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    type Error = ArtifactError;

    fn load(&self) -> Result<ModelArtifacts, Self::Error> {
        let manifest = self.read_manifest()?;
        let manifest = manifest.as_ref();

        let feature_order: Vec<String> =
            parse(FEATURE_ORDER_FILE, &self.read_artifact(FEATURE_ORDER_FILE, manifest)?)?;
        let codebook: Codebook = parse(CODEBOOK_FILE, &self.read_artifact(CODEBOOK_FILE, manifest)?)?;

        let mut models = Vec::with_capacity(Condition::ALL.len());
        for condition in Condition::ALL {
            let name = model_file_name(condition);
            let export: ExportedLogisticModel = parse(&name, &self.read_artifact(&name, manifest)?)?;
            if export.condition != condition.key() {
                return Err(ArtifactError::Invalid {
                    name,
                    reason: format!("exported for condition {}", export.condition),
                });
            }

            let model = Arc::new(LogisticModel::from_export(export, &feature_order)?);
            tracing::debug!("Loaded {} ({} features)", name, model.feature_count());
            models.push(ConditionModel {
                condition,
                classifier: model.clone(),
                explainer: model,
            });
        }

        tracing::info!(
            "Loaded {} condition models from {:?}",
            models.len(),
            self.dir
        );

        Ok(ModelArtifacts {
            feature_order,
            codebook,
            models,
            created_at: manifest.and_then(|m| m.created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) {
        let bytes = serde_json::to_vec_pretty(value).expect("Should serialize");
        fs::write(dir.join(name), bytes).expect("Should write");
    }

    fn artifact_dir() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let order = vec!["age".to_string(), "race_ethnicity".to_string()];
        write_json(dir.path(), FEATURE_ORDER_FILE, &order);

        let mut codebook = Codebook::new();
        codebook.insert(
            "race_ethnicity".into(),
            [("Asian".to_string(), 0), ("White".to_string(), 1)].into_iter().collect(),
        );
        write_json(dir.path(), CODEBOOK_FILE, &codebook);

        for condition in Condition::ALL {
            let export = ExportedLogisticModel {
                condition: condition.key().to_string(),
                feature_names: order.clone(),
                intercept: -2.0,
                coefficients: vec![0.1, 0.2],
                scaler_mean: vec![30.0, 0.5],
                scaler_scale: vec![5.0, 0.5],
            };
            write_json(dir.path(), &model_file_name(condition), &export);
        }
        dir
    }

    fn seal(dir: &Path) {
        ArtifactManifest::seal(dir, Utc::now())
            .expect("Should seal")
            .write(dir)
            .expect("Should write manifest");
    }

    #[test]
    fn test_load_sealed_directory() {
        let dir = artifact_dir();
        seal(dir.path());

        let artifacts = DirectoryArtifactStore::new(dir.path())
            .load()
            .expect("Should load");
        assert_eq!(artifacts.feature_order, vec!["age", "race_ethnicity"]);
        assert_eq!(artifacts.models.len(), 5);
        assert_eq!(artifacts.models[0].condition, Condition::Hemorrhage);
        assert!(artifacts.created_at.is_some());
    }

    #[test]
    fn test_digest_mismatch_fails() {
        let dir = artifact_dir();
        seal(dir.path());
        fs::write(dir.path().join(CODEBOOK_FILE), b"{}").expect("Should write");

        let err = DirectoryArtifactStore::new(dir.path())
            .load()
            .expect_err("Tampered codebook must fail");
        assert!(matches!(err, ArtifactError::DigestMismatch(name) if name == CODEBOOK_FILE));
    }

    #[test]
    fn test_missing_model_fails() {
        let dir = artifact_dir();
        seal(dir.path());
        fs::remove_file(dir.path().join("sepsis_outcome_model.json")).expect("Should remove");

        let err = DirectoryArtifactStore::new(dir.path())
            .load()
            .expect_err("Missing model must fail");
        assert!(matches!(err, ArtifactError::Missing(_)));
    }

    #[test]
    fn test_unsealed_directory_requires_opt_in() {
        let dir = artifact_dir();

        let err = DirectoryArtifactStore::new(dir.path())
            .load()
            .expect_err("Unsealed must fail by default");
        assert!(matches!(err, ArtifactError::Missing(path) if path.ends_with(MANIFEST_FILE)));

        let result = DirectoryArtifactStore::new(dir.path())
            .allow_unsealed(true)
            .load();
        assert_eq!(result.is_ok(), cfg!(debug_assertions));
    }

    #[test]
    fn test_condition_mismatch_fails() {
        let dir = artifact_dir();
        let export = ExportedLogisticModel {
            condition: "ppd_outcome".into(),
            feature_names: vec!["age".into(), "race_ethnicity".into()],
            intercept: 0.0,
            coefficients: vec![0.0, 0.0],
            scaler_mean: vec![0.0, 0.0],
            scaler_scale: vec![1.0, 1.0],
        };
        write_json(dir.path(), "pph_outcome_model.json", &export);
        seal(dir.path());

        let err = DirectoryArtifactStore::new(dir.path())
            .load()
            .expect_err("Wrong condition must fail");
        assert!(matches!(err, ArtifactError::Invalid { .. }));
    }

    #[test]
    fn test_bundled_models_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let artifacts = DirectoryArtifactStore::new(dir)
            .load()
            .expect("Bundled models should verify");
        assert_eq!(artifacts.feature_order.len(), 45);
        assert_eq!(artifacts.codebook.len(), 3);
    }
}
