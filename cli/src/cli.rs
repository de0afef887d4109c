//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Provision an isolated runtime environment for a project
#[derive(Parser)]
#[command(name = "envstrap", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also disabled when NO_COLOR is set)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file; a relative path resolves against the project directory
    /// [default: <project-dir>/envstrap.yaml]
    #[arg(long, global = true, env = "ENVSTRAP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory [default: current directory]
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision the environment (default when no command is given)
    Run(commands::run::RunArgs),

    /// Show resolved paths and step commands without running anything
    Plan,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the run log
    /// cannot be written. Failed provisioning steps are reported through the
    /// exit code, not as an error.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            project_dir,
            command,
        } = self;

        let flags = AppFlags {
            no_color,
            quiet,
            json,
            config,
            project_dir,
        };

        match command.unwrap_or_else(|| Command::Run(commands::run::RunArgs::default())) {
            Command::Run(args) => {
                let app = AppContext::new(flags)?;
                commands::run::run(&args, &app).await
            }
            Command::Plan => {
                let app = AppContext::new(flags)?;
                commands::plan::run(&app)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
