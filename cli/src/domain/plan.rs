//! Provisioning plan: resolved paths and the command line of every step.
//!
//! Pure functions only. The plan is built once per run and shared by the
//! `run` and `plan` commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::domain::config::{EnvstrapConfig, FailurePolicy, ToolCommand};
use crate::domain::environment::{ActivatedEnvironment, EnvironmentLayout};

/// Fallback used when the running executable has no usable file stem.
pub const DEFAULT_PROGRAM_NAME: &str = "envstrap";

// ── Steps ────────────────────────────────────────────────────────────────────

/// The external steps of a run, in execution order.
///
/// Path resolution, the `Begin` marker and the `End` marker frame these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    InstallIsolationTool,
    CreateEnvironment,
    ActivateEnvironment,
    InstallDependencies,
    Verify,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::InstallIsolationTool,
        Step::CreateEnvironment,
        Step::ActivateEnvironment,
        Step::InstallDependencies,
        Step::Verify,
    ];

    /// 1-based position within [`Step::ALL`].
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Step::InstallIsolationTool => 1,
            Step::CreateEnvironment => 2,
            Step::ActivateEnvironment => 3,
            Step::InstallDependencies => 4,
            Step::Verify => 5,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::InstallIsolationTool => "install isolation tool",
            Step::CreateEnvironment => "create environment",
            Step::ActivateEnvironment => "activate environment",
            Step::InstallDependencies => "install dependencies",
            Step::Verify => "run verification",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Every filesystem location a run touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub project_dir: PathBuf,
    pub program_name: String,
    pub log_file: PathBuf,
    pub environment_dir: PathBuf,
    pub manifest: PathBuf,
    pub entry_point: PathBuf,
}

/// Resolve configured paths against the project directory.
///
/// The log defaults to `<project_dir>/<program_name>.log`.
#[must_use]
pub fn resolve_paths(project_dir: &Path, program_name: &str, config: &EnvstrapConfig) -> ResolvedPaths {
    let log_file = config.log_file.as_ref().map_or_else(
        || project_dir.join(format!("{program_name}.log")),
        |p| project_dir.join(p),
    );
    ResolvedPaths {
        project_dir: project_dir.to_path_buf(),
        program_name: program_name.to_string(),
        log_file,
        environment_dir: project_dir.join(&config.environment_dir),
        manifest: project_dir.join(&config.manifest),
        entry_point: project_dir.join(&config.entry_point),
    }
}

/// Base name of an executable path without its extension.
#[must_use]
pub fn program_name_from(exe: Option<&Path>) -> String {
    exe.and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PROGRAM_NAME)
        .to_string()
}

// ── Plan ─────────────────────────────────────────────────────────────────────

/// Resolved paths, tools and policy for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub paths: ResolvedPaths,
    pub layout: EnvironmentLayout,
    pub interpreter: ToolCommand,
    pub package_manager: ToolCommand,
    pub isolation_tool: ToolCommand,
    pub isolation_package: String,
    pub policy: FailurePolicy,
    pub recreate: bool,
    pub step_timeout: Option<Duration>,
}

impl ProvisionPlan {
    #[must_use]
    pub fn build(config: &EnvstrapConfig, project_dir: &Path, program_name: &str) -> Self {
        let paths = resolve_paths(project_dir, program_name, config);
        let layout = EnvironmentLayout::for_dir(&paths.environment_dir);
        Self {
            paths,
            layout,
            interpreter: config.tools.interpreter.clone(),
            package_manager: config.tools.package_manager(),
            isolation_tool: config.tools.isolation_tool(),
            isolation_package: config.isolation_package.clone(),
            policy: config.failure_policy,
            recreate: config.recreate,
            step_timeout: config.step_timeout_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn install_tool_command(&self) -> ToolCommand {
        self.package_manager
            .with_args(["install".to_string(), self.isolation_package.clone()])
    }

    #[must_use]
    pub fn create_environment_command(&self) -> ToolCommand {
        self.isolation_tool.with_args([display(&self.paths.environment_dir)])
    }

    /// Dependency install; uses the environment's interpreter once activated,
    /// the system package manager otherwise.
    #[must_use]
    pub fn install_dependencies_command(&self, env: Option<&ActivatedEnvironment>) -> ToolCommand {
        let base = env.map_or_else(
            || self.package_manager.clone(),
            |e| ToolCommand::new(e.interpreter()).with_args(["-m", "pip"]),
        );
        base.with_args(["install".to_string(), "-r".to_string(), display(&self.paths.manifest)])
    }

    #[must_use]
    pub fn verify_command(&self, env: Option<&ActivatedEnvironment>) -> ToolCommand {
        let base = env.map_or_else(
            || self.interpreter.clone(),
            |e| ToolCommand::new(e.interpreter()),
        );
        base.with_args([display(&self.paths.entry_point)])
    }

    /// Command line for `step` as it would run with `env`; activation runs
    /// no external process.
    #[must_use]
    pub fn command_for(&self, step: Step, env: Option<&ActivatedEnvironment>) -> Option<ToolCommand> {
        match step {
            Step::InstallIsolationTool => Some(self.install_tool_command()),
            Step::CreateEnvironment => Some(self.create_environment_command()),
            Step::ActivateEnvironment => None,
            Step::InstallDependencies => Some(self.install_dependencies_command(env)),
            Step::Verify => Some(self.verify_command(env)),
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
