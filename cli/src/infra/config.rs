//! Infrastructure implementation of the `ConfigStore` port.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{CONFIG_FILE_NAME, EnvstrapConfig};

/// Reads `envstrap.yaml`.
///
/// An explicitly requested file must exist; the default file in the project
/// directory is optional and its absence means defaults.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
    project_dir: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit,
            project_dir: project_dir.into(),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<EnvstrapConfig> {
        let path = self.path();
        if self.explicit.is_none() && !path.exists() {
            return Ok(EnvstrapConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(EnvstrapConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> PathBuf {
        match &self.explicit {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.project_dir.join(path),
            None => self.project_dir.join(CONFIG_FILE_NAME),
        }
    }
}
