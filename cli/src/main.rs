//! envstrap - provision an isolated runtime environment for a project

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use envstrap_cli::cli::Cli;
use envstrap_cli::output::{OutputContext, json};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries progress and --json output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (json_mode, no_color) = (cli.json, cli.no_color);
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_fatal(&e, json_mode, no_color);
            ExitCode::FAILURE
        }
    }
}

fn report_fatal(err: &anyhow::Error, json_mode: bool, no_color: bool) {
    let message = format!("{err:#}");
    if json_mode {
        if let Ok(text) = json::format_error(&message, json::error_code(err)) {
            println!("{text}");
            return;
        }
    }
    OutputContext::new(no_color, false).error(&format!("Error: {message}"));
}
