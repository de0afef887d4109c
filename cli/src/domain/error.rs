//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating an `envstrap.yaml` file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: must not be empty")]
    EmptyValue { key: String },

    #[error("Invalid value for step_timeout_secs: must be greater than zero")]
    ZeroTimeout,

    /// Context attached to every load or validation failure of a config file.
    #[error("invalid config {path}")]
    Invalid { path: String },
}

// ── Manifest errors ───────────────────────────────────────────────────────────

/// Errors raised while reading the dependency manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Manifest line {line} is not a valid requirement: {content}")]
    Malformed { line: usize, content: String },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors describing why a provisioning step could not do its job.
///
/// These never abort the process; they are rendered into step diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("aborted after {step} failed")]
    Aborted { step: String },

    #[error("environment interpreter not found at {path}")]
    MissingInterpreter { path: String },

    #[error("{program} exited with status {code}")]
    NonZeroExit { program: String, code: i32 },

    #[error("{program} was terminated by a signal")]
    Terminated { program: String },
}
