//! `envstrap run`: provision the environment.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service::ConfigOverrides;
use crate::application::services::provision::{self as service, ProvisionPorts};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::LocalFs;
use crate::infra::run_log::FileRunLog;
use crate::output::json;

/// Arguments for the run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Stop at the first failed step instead of running the rest
    #[arg(long)]
    pub fail_fast: bool,

    /// Run the isolation tool even if the environment already exists
    #[arg(long)]
    pub recreate: bool,

    /// Write the run log here [default: <project-dir>/<program>.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Run `envstrap run`.
///
/// Exits with failure when any step failed; the run log has the details.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the run log cannot
/// be written.
pub async fn run(args: &RunArgs, app: &AppContext) -> Result<ExitCode> {
    let overrides = ConfigOverrides {
        fail_fast: args.fail_fast,
        recreate: args.recreate,
        log_file: args.log_file.clone(),
    };
    let config = app.load_config(&overrides)?;
    let plan = app.plan(&config);

    let runner = TokioCommandRunner::new(&plan.paths.project_dir);
    let log = FileRunLog::new(&plan.paths.log_file);
    let reporter = app.terminal_reporter();
    let inherited_path = std::env::var_os("PATH");

    let report = service::provision(
        &ProvisionPorts {
            runner: &runner,
            log: &log,
            fs: &LocalFs,
            reporter: &reporter,
        },
        &plan,
        inherited_path.as_deref(),
    )
    .await?;

    if app.is_json() {
        println!("{}", json::to_pretty(&report)?);
    } else {
        app.human().render_report(&report);
    }

    Ok(if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
