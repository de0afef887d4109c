//! Shared mock infrastructure for unit tests.
//!
//! Provides a recording [`CommandRunner`], an in-memory [`RunLog`], a fake
//! filesystem and a recording [`ProgressReporter`] so each test only states
//! what differs.

#![allow(clippy::expect_used, dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use envstrap_cli::application::ports::{CommandRunner, LocalFs, ProgressReporter, RunLog};

// ── Output helpers ────────────────────────────────────────────────────────────

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Fake filesystem ───────────────────────────────────────────────────────────

/// In-memory files, shared so a mock runner can "create" them.
#[derive(Clone, Default)]
pub struct FakeFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl FakeFs {
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.add(path, content);
        self
    }

    pub fn add(&self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .lock()
            .expect("mutex poisoned")
            .insert(path.into(), content.to_string());
    }
}

impl LocalFs for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("mutex poisoned").contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.files.lock().expect("mutex poisoned").get(path) {
            Some(content) => Ok(content.clone()),
            None => bail!("no such file: {}", path.display()),
        }
    }
}

// ── MockCommandRunner ─────────────────────────────────────────────────────────

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Call {
    /// `program arg arg ...`, for compact assertions.
    pub fn line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

type Responder = dyn Fn(&Call) -> Result<Output> + Send + Sync;

/// A `CommandRunner` that records every call and answers through a closure.
#[derive(Clone)]
pub struct MockCommandRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    respond: Arc<Responder>,
}

impl MockCommandRunner {
    pub fn new(respond: impl Fn(&Call) -> Result<Output> + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(respond),
        }
    }

    /// Every call succeeds with empty output.
    pub fn new_ok() -> Self {
        Self::new(|_| Ok(ok_output(b"")))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    fn record(&self, call: Call) -> Result<Output> {
        let result = (self.respond)(&call);
        self.calls.lock().expect("mutex poisoned").push(call);
        result
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

impl CommandRunner for MockCommandRunner {
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
    ) -> Result<Output> {
        self.record(Call {
            program: program.to_string(),
            args: owned(args),
            env: env.to_vec(),
            timeout: None,
        })
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
        timeout: Duration,
    ) -> Result<Output> {
        self.record(Call {
            program: program.to_string(),
            args: owned(args),
            env: env.to_vec(),
            timeout: Some(timeout),
        })
    }
}

// ── MemoryRunLog ──────────────────────────────────────────────────────────────

/// In-memory `RunLog`; `begin` truncates like the file implementation.
pub struct MemoryRunLog {
    path: PathBuf,
    buf: Mutex<Vec<u8>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::with_content("")
    }

    /// Start from leftover content of a previous run.
    pub fn with_content(content: &str) -> Self {
        Self {
            path: PathBuf::from("/proj/envstrap.log"),
            buf: Mutex::new(content.as_bytes().to_vec()),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().expect("mutex poisoned")).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl RunLog for MemoryRunLog {
    fn begin(&self) -> Result<()> {
        *self.buf.lock().expect("mutex poisoned") = b"Begin\n".to_vec();
        Ok(())
    }

    fn line(&self, text: &str) -> Result<()> {
        let mut buf = self.buf.lock().expect("mutex poisoned");
        buf.extend_from_slice(text.as_bytes());
        buf.push(b'\n');
        Ok(())
    }

    fn append(&self, bytes: &[u8]) -> Result<()> {
        self.buf.lock().expect("mutex poisoned").extend_from_slice(bytes);
        Ok(())
    }

    fn end(&self) -> Result<()> {
        self.line("End")
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

// ── RecordingReporter ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("mutex poisoned").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("mutex poisoned").push(format!("step: {message}"));
    }

    fn success(&self, message: &str) {
        self.events.lock().expect("mutex poisoned").push(format!("success: {message}"));
    }

    fn warn(&self, message: &str) {
        self.events.lock().expect("mutex poisoned").push(format!("warn: {message}"));
    }
}
