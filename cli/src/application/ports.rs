//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::EnvstrapConfig;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program with extra environment variables set on top of the
    /// inherited environment, and capture its output.
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
    ) -> Result<Output>;
    /// Run a program with extra environment variables and a timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. On timeout the
    /// child is killed and the error is a [`CommandTimedOut`] holding the
    /// output captured up to that point.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
        timeout: Duration,
    ) -> Result<Output>;
}

/// A process outlived its timeout and was killed.
#[derive(Debug, thiserror::Error)]
#[error("{program} timed out after {timeout:?}")]
pub struct CommandTimedOut {
    pub program: String,
    pub timeout: Duration,
    /// Everything the process wrote before it was killed.
    pub partial: Output,
}

// ── Run Log Port ──────────────────────────────────────────────────────────────

/// The append-only run log.
///
/// `begin` is the only operation allowed to truncate; every other write
/// appends to what is already there. A step's captured stdout is appended
/// before its stderr, so lines the process interleaved across the two
/// streams appear grouped by stream.
pub trait RunLog {
    /// Create or truncate the log and write the `Begin` marker.
    fn begin(&self) -> Result<()>;
    /// Append one line of text.
    fn line(&self, text: &str) -> Result<()>;
    /// Append raw captured process output.
    fn append(&self, bytes: &[u8]) -> Result<()>;
    /// Write the `End` marker.
    fn end(&self) -> Result<()>;
    /// Where the log lives.
    fn path(&self) -> &Path;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// The filesystem checks the orchestrator needs.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// Read a whole text file.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts where configuration comes from.
pub trait ConfigStore {
    /// Load configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<EnvstrapConfig>;
    /// The file `load` reads.
    fn path(&self) -> PathBuf;
}
