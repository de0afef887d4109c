//! Domain layer: pure provisioning logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod outcome;
pub mod plan;

pub use config::{EnvstrapConfig, FailurePolicy, ToolCommand, ToolsConfig, validate_config};
pub use environment::{ActivatedEnvironment, EnvironmentLayout};
pub use error::{ConfigError, ManifestError, ProvisionError};
pub use manifest::{Manifest, Requirement, parse_manifest};
pub use outcome::{RunReport, StepOutcome, StepReport};
pub use plan::{ProvisionPlan, ResolvedPaths, Step, program_name_from, resolve_paths};
