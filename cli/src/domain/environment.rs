//! Isolated environment layout and explicit activation.
//!
//! Activation never touches the process environment. It produces an
//! [`ActivatedEnvironment`] value that later steps receive explicitly.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

#[cfg(windows)]
const INTERPRETER: &str = "python.exe";
#[cfg(not(windows))]
const INTERPRETER: &str = "python";

/// Where the isolation tool places the environment's own tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentLayout {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub interpreter: PathBuf,
}

impl EnvironmentLayout {
    #[must_use]
    pub fn for_dir(root: &Path) -> Self {
        let bin_dir = root.join(BIN_DIR);
        let interpreter = bin_dir.join(INTERPRETER);
        Self {
            root: root.to_path_buf(),
            bin_dir,
            interpreter,
        }
    }
}

/// An environment that subsequent steps resolve their tools against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedEnvironment {
    pub layout: EnvironmentLayout,
    /// `PATH` with the environment's bin directory in front.
    pub path: String,
}

impl ActivatedEnvironment {
    /// Build the activation for `layout` on top of the caller's `PATH`.
    #[must_use]
    pub fn new(layout: EnvironmentLayout, inherited_path: Option<&OsStr>) -> Self {
        let mut dirs = vec![layout.bin_dir.clone()];
        if let Some(existing) = inherited_path {
            dirs.extend(std::env::split_paths(existing));
        }
        let path = std::env::join_paths(&dirs).map_or_else(
            |_| layout.bin_dir.to_string_lossy().into_owned(),
            |joined| joined.to_string_lossy().into_owned(),
        );
        Self { layout, path }
    }

    /// Variables every process run inside the environment gets.
    #[must_use]
    pub fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            (
                "VIRTUAL_ENV".to_string(),
                self.layout.root.to_string_lossy().into_owned(),
            ),
            ("PATH".to_string(), self.path.clone()),
        ]
    }

    #[must_use]
    pub fn interpreter(&self) -> String {
        self.layout.interpreter.to_string_lossy().into_owned()
    }
}
