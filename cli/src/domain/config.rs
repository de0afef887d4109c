//! Domain types and validators for envstrap configuration.
//!
//! Pure functions only; no I/O.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Interpreter used when the config file does not name one.
#[cfg(windows)]
pub const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_INTERPRETER: &str = "python3";

pub const DEFAULT_ISOLATION_PACKAGE: &str = "virtualenv";
pub const DEFAULT_ENVIRONMENT_DIR: &str = "venv";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
pub const DEFAULT_ENTRY_POINT: &str = "test.py";

/// File name looked up in the project directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = "envstrap.yaml";

// ── Tool commands ────────────────────────────────────────────────────────────

/// A program plus the leading arguments every invocation starts with.
///
/// `python3 -m pip` is `ToolCommand { program: "python3", args: ["-m", "pip"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Return a copy with `extra` appended to the argument list.
    #[must_use]
    pub fn with_args<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = self.args.clone();
        args.extend(extra.into_iter().map(Into::into));
        Self {
            program: self.program.clone(),
            args,
        }
    }

    /// Arguments as borrowed slices, the shape `CommandRunner` takes.
    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        format!("\"{word}\"")
    } else {
        word.to_string()
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// What the orchestrator does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Run every remaining step regardless of earlier failures.
    #[default]
    Continue,
    /// Skip every remaining step after the first failure.
    FailFast,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailurePolicy::Continue => "continue",
            FailurePolicy::FailFast => "fail-fast",
        })
    }
}

/// External tools the provisioning sequence drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// System interpreter, used when no environment is active.
    pub interpreter: ToolCommand,
    /// System package manager. Defaults to `<interpreter> -m pip`.
    pub package_manager: Option<ToolCommand>,
    /// Environment isolation tool. Defaults to `<interpreter> -m virtualenv`.
    pub isolation_tool: Option<ToolCommand>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            interpreter: ToolCommand::new(DEFAULT_INTERPRETER),
            package_manager: None,
            isolation_tool: None,
        }
    }
}

impl ToolsConfig {
    #[must_use]
    pub fn package_manager(&self) -> ToolCommand {
        self.package_manager
            .clone()
            .unwrap_or_else(|| self.interpreter.with_args(["-m", "pip"]))
    }

    #[must_use]
    pub fn isolation_tool(&self) -> ToolCommand {
        self.isolation_tool
            .clone()
            .unwrap_or_else(|| self.interpreter.with_args(["-m", "virtualenv"]))
    }
}

/// Top-level configuration stored in `envstrap.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvstrapConfig {
    pub tools: ToolsConfig,
    /// Package the system package manager installs to get the isolation tool.
    pub isolation_package: String,
    /// Environment directory, relative to the project directory.
    pub environment_dir: PathBuf,
    /// Dependency manifest, relative to the project directory.
    pub manifest: PathBuf,
    /// Verification entry point, relative to the project directory.
    pub entry_point: PathBuf,
    /// Overrides the derived `<project>/<program>.log` path.
    pub log_file: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
    /// Invoke the isolation tool even when the environment already exists.
    pub recreate: bool,
    /// Per-step timeout. `None` waits forever.
    pub step_timeout_secs: Option<u64>,
}

impl Default for EnvstrapConfig {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            isolation_package: DEFAULT_ISOLATION_PACKAGE.to_string(),
            environment_dir: PathBuf::from(DEFAULT_ENVIRONMENT_DIR),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
            log_file: None,
            failure_policy: FailurePolicy::default(),
            recreate: false,
            step_timeout_secs: None,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a loaded configuration.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first offending key.
pub fn validate_config(config: &EnvstrapConfig) -> Result<()> {
    let tools = &config.tools;
    let programs = [
        ("tools.interpreter.program", Some(&tools.interpreter)),
        ("tools.package_manager.program", tools.package_manager.as_ref()),
        ("tools.isolation_tool.program", tools.isolation_tool.as_ref()),
    ];
    for (key, tool) in programs {
        if tool.is_some_and(|t| t.program.trim().is_empty()) {
            return Err(empty(key));
        }
    }

    if config.isolation_package.trim().is_empty() {
        return Err(empty("isolation_package"));
    }
    let paths = [
        ("environment_dir", &config.environment_dir),
        ("manifest", &config.manifest),
        ("entry_point", &config.entry_point),
    ];
    for (key, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(empty(key));
        }
    }
    if config.step_timeout_secs == Some(0) {
        return Err(ConfigError::ZeroTimeout.into());
    }
    Ok(())
}

fn empty(key: &str) -> anyhow::Error {
    ConfigError::EmptyValue {
        key: key.to_string(),
    }
    .into()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
