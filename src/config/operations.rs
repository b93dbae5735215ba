//! Config loading, validation, and path resolution.

use super::model::Config;
use crate::error::{Result, SprintError};
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(SprintError::UserError)` - Read or parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SprintError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                SprintError::UserError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SprintError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validation rules:
    /// - `max_parallel` must be positive
    /// - `agents_file` and `roadmap_file` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_parallel == 0 {
            return Err(SprintError::UserError(
                "config validation failed: max_parallel must be greater than 0".to_string(),
            ));
        }

        for (field, value) in [
            ("agents_file", &self.agents_file),
            ("roadmap_file", &self.roadmap_file),
        ] {
            if value.trim().is_empty() {
                return Err(SprintError::UserError(format!(
                    "config validation failed: {} must not be empty",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Path of the agent roster given the state directory.
    pub fn agents_path(&self, state_dir: &Path) -> PathBuf {
        state_dir.join(&self.agents_file)
    }

    /// Path of the roadmap store given the state directory.
    pub fn roadmap_path(&self, state_dir: &Path) -> PathBuf {
        state_dir.join(&self.roadmap_file)
    }
}
