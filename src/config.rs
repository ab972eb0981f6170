//! Runtime configuration from environment variables.

use std::path::PathBuf;

pub const MODEL_DIR_ENV: &str = "POSTPARTUM_MODEL_DIR";
pub const PARALLEL_CONDITIONS_ENV: &str = "POSTPARTUM_PARALLEL_CONDITIONS";
pub const ALLOW_UNSEALED_MODELS_ENV: &str = "POSTPARTUM_ALLOW_UNSEALED_MODELS";

const DEFAULT_MODEL_DIR: &str = "models";

/// Settings for loading artifacts and running predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding `manifest.json`, `feature_order.json`, `codebook.json`
    /// and one `<condition>_model.json` per condition.
    pub model_dir: PathBuf,
    /// Score conditions on the rayon pool instead of one after another.
    pub parallel_conditions: bool,
    /// Accept a model directory without a manifest. Always false in release builds.
    pub allow_unsealed_models: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            parallel_conditions: true,
            allow_unsealed_models: false,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let model_dir = std::env::var(MODEL_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let parallel_conditions = std::env::var(PARALLEL_CONDITIONS_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(defaults.parallel_conditions);

        let allow_unsealed_models = cfg!(debug_assertions) && parse_bool_env(ALLOW_UNSEALED_MODELS_ENV);

        Self {
            model_dir,
            parallel_conditions,
            allow_unsealed_models,
        }
    }

    #[must_use]
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_parallel_conditions(mut self, parallel: bool) -> Self {
        self.parallel_conditions = parallel;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

/// Boolean environment flag; unset or unrecognized values are false.
#[must_use]
pub fn parse_bool_env(name: &str) -> bool {
    std::env::var(name).map(|v| is_truthy(&v)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        for v in ["1", "true", "TRUE", "yes", "YES"] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["0", "false", "True", "on", ""] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert!(config.parallel_conditions);
        assert!(!config.allow_unsealed_models);
    }

    #[test]
    fn test_builders_override() {
        let config = EngineConfig::default()
            .with_model_dir("/srv/models")
            .with_parallel_conditions(false);
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert!(!config.parallel_conditions);
    }
}
