//! File-backed implementation of the `RunLog` port.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::RunLog;

pub const BEGIN_MARKER: &str = "Begin";
pub const END_MARKER: &str = "End";

/// Plain-text run log on disk.
///
/// `begin` truncates; every later write reopens the file in append mode, so
/// output a child process wrote is never overwritten.
pub struct FileRunLog {
    path: PathBuf,
}

impl FileRunLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_append(&self, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("opening log {}", self.path.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("writing log {}", self.path.display()))
    }
}

impl RunLog for FileRunLog {
    fn begin(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        std::fs::write(&self.path, format!("{BEGIN_MARKER}\n"))
            .with_context(|| format!("creating log {}", self.path.display()))
    }

    fn line(&self, text: &str) -> Result<()> {
        self.write_append(format!("{text}\n").as_bytes())
    }

    fn append(&self, bytes: &[u8]) -> Result<()> {
        self.write_append(bytes)
    }

    fn end(&self) -> Result<()> {
        self.line(END_MARKER)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
