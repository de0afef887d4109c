//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once in `Cli::run()` from the top-level flags so
//! command handlers never re-derive the project directory, program name or
//! output mode themselves.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::services::config_service::{self, ConfigOverrides};
use crate::domain::config::EnvstrapConfig;
use crate::domain::plan::{ProvisionPlan, program_name_from};
use crate::infra::config::YamlConfigStore;
use crate::output::human::HumanRenderer;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Explicit config file.
    pub config: Option<PathBuf>,
    /// Project directory; defaults to the current directory.
    pub project_dir: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Directory every relative path resolves against.
    pub project_dir: PathBuf,
    /// Base name of the running executable; names the default log file.
    pub program_name: String,
    /// Where configuration is read from.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let project_dir = match flags.project_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        let exe = std::env::current_exe().ok();

        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        // JSON output owns stdout; progress lines would corrupt it.
        let quiet = flags.quiet || flags.json;

        Ok(Self {
            output: OutputContext::new(flags.no_color, quiet),
            mode,
            config_store: YamlConfigStore::new(flags.config, &project_dir),
            program_name: program_name_from(exe.as_deref()),
            project_dir,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Load and validate configuration with command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid.
    pub fn load_config(&self, overrides: &ConfigOverrides) -> Result<EnvstrapConfig> {
        config_service::load_config(&self.config_store, overrides)
    }

    /// Build the provisioning plan for this project.
    #[must_use]
    pub fn plan(&self, config: &EnvstrapConfig) -> ProvisionPlan {
        ProvisionPlan::build(config, &self.project_dir, &self.program_name)
    }

    /// Progress reporter bound to this context's output settings.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Human renderer bound to this context's output settings.
    #[must_use]
    pub fn human(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }
}
