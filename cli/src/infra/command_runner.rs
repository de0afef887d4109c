//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution, with an optional timeout that kills the
//! child on all platforms.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::application::ports::{CommandRunner, CommandTimedOut};

/// How long to keep reading after a timeout kill. A grandchild that
/// inherited the pipes can hold them open long after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Production `CommandRunner`.
///
/// Every process runs in `working_dir` with piped stdout and stderr.
/// `tokio::time::timeout` around `.output().await` would drop the future
/// without terminating the process on Windows, so the timeout path uses
/// `tokio::select!` with an explicit `child.kill()`.
pub struct TokioCommandRunner {
    working_dir: PathBuf,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn spawn(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
    ) -> Result<(tokio::process::Child, Drain, Drain)> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        let stdout = Drain::start(child.stdout.take());
        let stderr = Drain::start(child.stderr.take());
        Ok((child, stdout, stderr))
    }
}

/// Reads one pipe on its own task into a buffer that outlives the wait on
/// the child, so bytes read before a timeout are kept.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl Drain {
    fn start<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let task = tokio::spawn(async move {
            let Some(mut reader) = reader else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                }
            }
        });
        Self { buf, task }
    }

    /// Wait for end of stream, or at most `grace`, and return what was read.
    async fn finish(self, grace: Option<Duration>) -> Vec<u8> {
        let Self { buf, mut task } = self;
        match grace {
            None => {
                let _ = (&mut task).await;
            }
            Some(grace) => {
                if tokio::time::timeout(grace, &mut task).await.is_err() {
                    task.abort();
                }
            }
        }
        std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
    ) -> Result<Output> {
        let (mut child, stdout, stderr) = self.spawn(program, args, env)?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))?;
        Ok(Output {
            status,
            stdout: stdout.finish(None).await,
            stderr: stderr.finish(None).await,
        })
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        env: &[(String, String)],
        timeout: Duration,
    ) -> Result<Output> {
        let (mut child, stdout, stderr) = self.spawn(program, args, env)?;

        let status = tokio::select! {
            status = child.wait() => status.with_context(|| format!("waiting for {program}"))?,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                let status = child
                    .wait()
                    .await
                    .with_context(|| format!("waiting for {program}"))?;
                let partial = Output {
                    status,
                    stdout: stdout.finish(Some(DRAIN_GRACE)).await,
                    stderr: stderr.finish(Some(DRAIN_GRACE)).await,
                };
                return Err(CommandTimedOut {
                    program: program.to_string(),
                    timeout,
                    partial,
                }
                .into());
            }
        };

        Ok(Output {
            status,
            stdout: stdout.finish(None).await,
            stderr: stderr.finish(None).await,
        })
    }
}
