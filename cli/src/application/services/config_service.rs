//! Application service: configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{EnvstrapConfig, FailurePolicy, validate_config};
use crate::domain::error::ConfigError;

/// Command-line overrides applied on top of the loaded file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub fail_fast: bool,
    pub recreate: bool,
    pub log_file: Option<std::path::PathBuf>,
}

/// Load, override and validate configuration.
///
/// # Errors
///
/// Returns an error carrying [`ConfigError::Invalid`] as context if the file
/// cannot be read or parsed, or if the merged configuration is invalid.
pub fn load_config(store: &impl ConfigStore, overrides: &ConfigOverrides) -> Result<EnvstrapConfig> {
    let invalid = || ConfigError::Invalid {
        path: store.path().display().to_string(),
    };
    let mut config = store.load().with_context(invalid)?;
    if overrides.fail_fast {
        config.failure_policy = FailurePolicy::FailFast;
    }
    if overrides.recreate {
        config.recreate = true;
    }
    if let Some(path) = &overrides.log_file {
        config.log_file = Some(path.clone());
    }
    validate_config(&config).with_context(invalid)?;
    Ok(config)
}
