//! Application service: the provisioning run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! A run is linear: `Begin`, the five [`Step`]s in order, `End`. Each step
//! blocks until its process exits. Step failures are recorded as
//! [`StepOutcome::Failed`] and never surface as `Err`; only run log I/O
//! failures do.

use std::ffi::OsStr;
use std::process::Output;
use std::time::Instant;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};

use crate::application::ports::{CommandRunner, CommandTimedOut, LocalFs, ProgressReporter, RunLog};
use crate::domain::config::{FailurePolicy, ToolCommand};
use crate::domain::environment::ActivatedEnvironment;
use crate::domain::error::ProvisionError;
use crate::domain::manifest::parse_manifest;
use crate::domain::outcome::{RunReport, StepOutcome, StepReport};
use crate::domain::plan::{ProvisionPlan, Step};

/// Reason recorded when the environment directory already holds an interpreter.
pub const ALREADY_EXISTS: &str = "environment already exists";

/// Injected dependencies of a run.
pub struct ProvisionPorts<'a, C, L, F, R>
where
    C: CommandRunner,
    L: RunLog,
    F: LocalFs,
    R: ProgressReporter,
{
    pub runner: &'a C,
    pub log: &'a L,
    pub fs: &'a F,
    pub reporter: &'a R,
}

/// Run every step of `plan`.
///
/// `inherited_path` is the caller's `PATH`, used to build the activated
/// environment's search path.
///
/// # Errors
///
/// Returns an error only if the run log cannot be created or written.
pub async fn provision<C, L, F, R>(
    ports: &ProvisionPorts<'_, C, L, F, R>,
    plan: &ProvisionPlan,
    inherited_path: Option<&OsStr>,
) -> Result<RunReport>
where
    C: CommandRunner,
    L: RunLog,
    F: LocalFs,
    R: ProgressReporter,
{
    let log = ports.log;
    let started_at = Utc::now();
    log.begin()?;
    log.line(&format!("started: {}", started_at.to_rfc3339_opts(SecondsFormat::Secs, true)))?;
    log.line(&format!("project: {}", plan.paths.project_dir.display()))?;
    log.line(&format!("environment: {}", plan.paths.environment_dir.display()))?;
    tracing::info!(
        project = %plan.paths.project_dir.display(),
        log_file = %log.path().display(),
        policy = ?plan.policy,
        "provisioning started"
    );

    let mut run = RunState::default();
    for step in Step::ALL {
        log.line(&format!("==> [{}/{}] {}", step.number(), Step::ALL.len(), step))?;

        let started = Instant::now();
        let (command, outcome) = if let Some(failed) = run.aborted_after {
            let reason = ProvisionError::Aborted {
                step: failed.to_string(),
            }
            .to_string();
            (None, StepOutcome::Skipped { reason })
        } else {
            ports.reporter.step(&format!("{step}..."));
            tracing::debug!(step = %step, "step started");
            execute_step(ports, plan, step, non_empty(inherited_path), &mut run).await?
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        log.line(&format!("<== {step}: {}", outcome.label()))?;
        report_outcome(ports.reporter, step, &outcome, plan.policy);
        tracing::info!(step = %step, outcome = %outcome.label(), duration_ms, "step finished");

        if outcome.is_failure() && plan.policy == FailurePolicy::FailFast && run.aborted_after.is_none() {
            run.aborted_after = Some(step);
        }
        run.steps.push(StepReport {
            step,
            command: command.map(|c| c.to_string()),
            outcome,
            duration_ms,
        });
    }

    log.end()?;
    let report = RunReport {
        log_file: log.path().to_path_buf(),
        started_at,
        steps: run.steps,
        aborted: run.aborted_after.is_some(),
    };
    tracing::info!(success = report.success(), aborted = report.aborted, "provisioning finished");
    Ok(report)
}

#[derive(Default)]
struct RunState {
    steps: Vec<StepReport>,
    activated: Option<ActivatedEnvironment>,
    aborted_after: Option<Step>,
}

fn non_empty(inherited: Option<&OsStr>) -> Option<&OsStr> {
    inherited.filter(|p| !p.is_empty())
}

async fn execute_step<C, L, F, R>(
    ports: &ProvisionPorts<'_, C, L, F, R>,
    plan: &ProvisionPlan,
    step: Step,
    inherited_path: Option<&OsStr>,
    run: &mut RunState,
) -> Result<(Option<ToolCommand>, StepOutcome)>
where
    C: CommandRunner,
    L: RunLog,
    F: LocalFs,
    R: ProgressReporter,
{
    let log = ports.log;
    match step {
        Step::InstallIsolationTool => {
            let cmd = plan.install_tool_command();
            let outcome = run_logged(ports.runner, log, plan, &cmd, &[]).await?;
            Ok((Some(cmd), outcome))
        }
        Step::CreateEnvironment => {
            let cmd = plan.create_environment_command();
            if !plan.recreate && ports.fs.exists(&plan.layout.interpreter) {
                log.line(&format!(
                    "{ALREADY_EXISTS} at {}",
                    plan.layout.root.display()
                ))?;
                return Ok((
                    Some(cmd),
                    StepOutcome::Skipped {
                        reason: ALREADY_EXISTS.to_string(),
                    },
                ));
            }
            let outcome = run_logged(ports.runner, log, plan, &cmd, &[]).await?;
            Ok((Some(cmd), outcome))
        }
        Step::ActivateEnvironment => {
            let interpreter = &plan.layout.interpreter;
            if !ports.fs.exists(interpreter) {
                let diagnostic = ProvisionError::MissingInterpreter {
                    path: interpreter.display().to_string(),
                }
                .to_string();
                log.line(&format!("error: {diagnostic}"))?;
                run.activated = None;
                return Ok((
                    None,
                    StepOutcome::Failed {
                        exit_code: None,
                        diagnostic,
                    },
                ));
            }
            let env = ActivatedEnvironment::new(plan.layout.clone(), inherited_path);
            log.line(&format!(
                "activated {} (interpreter {})",
                env.layout.root.display(),
                env.interpreter()
            ))?;
            run.activated = Some(env);
            Ok((None, StepOutcome::Succeeded))
        }
        Step::InstallDependencies => {
            check_manifest(ports, plan)?;
            let cmd = plan.install_dependencies_command(run.activated.as_ref());
            let env = activation_vars(run.activated.as_ref());
            let outcome = run_logged(ports.runner, log, plan, &cmd, &env).await?;
            Ok((Some(cmd), outcome))
        }
        Step::Verify => {
            let cmd = plan.verify_command(run.activated.as_ref());
            let env = activation_vars(run.activated.as_ref());
            let outcome = run_logged(ports.runner, log, plan, &cmd, &env).await?;
            Ok((Some(cmd), outcome))
        }
    }
}

fn activation_vars(env: Option<&ActivatedEnvironment>) -> Vec<(String, String)> {
    env.map(ActivatedEnvironment::env_vars).unwrap_or_default()
}

/// Warn early about a missing or malformed manifest. The install still runs.
fn check_manifest<C, L, F, R>(ports: &ProvisionPorts<'_, C, L, F, R>, plan: &ProvisionPlan) -> Result<()>
where
    C: CommandRunner,
    L: RunLog,
    F: LocalFs,
    R: ProgressReporter,
{
    let path = &plan.paths.manifest;
    let warning = if ports.fs.exists(path) {
        match ports.fs.read_to_string(path).map(|text| parse_manifest(&text)) {
            Ok(Ok(manifest)) => {
                ports.log.line(&format!(
                    "manifest: {} requirement(s): {}",
                    manifest.requirements().len(),
                    manifest.package_names().join(", ")
                ))?;
                return Ok(());
            }
            Ok(Err(e)) => format!("manifest {}: {e}", path.display()),
            Err(e) => format!("cannot read manifest {}: {e:#}", path.display()),
        }
    } else {
        format!("manifest not found: {}", path.display())
    };
    ports.log.line(&format!("warning: {warning}"))?;
    ports.reporter.warn(&warning);
    tracing::warn!(manifest = %path.display(), "{warning}");
    Ok(())
}

/// Run `cmd`, append its stdout then its stderr to the log, and classify the
/// exit. A timed-out process still gets whatever it wrote before the kill.
async fn run_logged(
    runner: &impl CommandRunner,
    log: &impl RunLog,
    plan: &ProvisionPlan,
    cmd: &ToolCommand,
    env: &[(String, String)],
) -> Result<StepOutcome> {
    log.line(&format!("$ {cmd}"))?;
    let args = cmd.arg_refs();
    let result = match plan.step_timeout {
        Some(timeout) => runner.run_with_timeout(&cmd.program, &args, env, timeout).await,
        None => runner.run_with_env(&cmd.program, &args, env).await,
    };

    match result {
        Ok(output) => {
            append_output(log, &output.stdout)?;
            append_output(log, &output.stderr)?;
            Ok(classify(&cmd.program, &output))
        }
        Err(e) => {
            if let Some(timed_out) = e.downcast_ref::<CommandTimedOut>() {
                append_output(log, &timed_out.partial.stdout)?;
                append_output(log, &timed_out.partial.stderr)?;
            }
            let diagnostic = format!("{e:#}");
            log.line(&format!("error: {diagnostic}"))?;
            Ok(StepOutcome::Failed {
                exit_code: None,
                diagnostic,
            })
        }
    }
}

fn append_output(log: &impl RunLog, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    log.append(bytes)?;
    if !bytes.ends_with(b"\n") {
        log.append(b"\n")?;
    }
    Ok(())
}

fn classify(program: &str, output: &Output) -> StepOutcome {
    if output.status.success() {
        return StepOutcome::Succeeded;
    }
    let code = output.status.code();
    let fallback = match code {
        Some(code) => ProvisionError::NonZeroExit {
            program: program.to_string(),
            code,
        },
        None => ProvisionError::Terminated {
            program: program.to_string(),
        },
    }
    .to_string();
    let diagnostic = last_line(&output.stderr)
        .or_else(|| last_line(&output.stdout))
        .unwrap_or(fallback);
    StepOutcome::Failed {
        exit_code: code,
        diagnostic,
    }
}

fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

fn report_outcome(reporter: &impl ProgressReporter, step: Step, outcome: &StepOutcome, policy: FailurePolicy) {
    match outcome {
        StepOutcome::Succeeded => reporter.success(step.title()),
        StepOutcome::Skipped { reason } if reason == ALREADY_EXISTS => {
            reporter.success(&format!("{step} skipped ({reason})"));
        }
        StepOutcome::Skipped { reason } => reporter.warn(&format!("{step} skipped ({reason})")),
        StepOutcome::Failed { diagnostic, .. } => {
            reporter.warn(&format!("{step} failed: {diagnostic}"));
            if policy == FailurePolicy::Continue {
                reporter.warn("continuing with the remaining steps");
            }
        }
    }
}
