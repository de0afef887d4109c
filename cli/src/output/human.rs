//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::outcome::RunReport;
use crate::domain::plan::{ProvisionPlan, Step};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Summarise a finished run.
    pub fn render_report(&self, report: &RunReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        if report.success() {
            self.ctx.success("Environment ready.");
        } else {
            let failed: Vec<&str> = report.failed_steps().iter().map(|s| s.title()).collect();
            self.ctx.warn(&format!("Failed steps: {}", failed.join(", ")));
            if report.aborted {
                self.ctx.warn("Run aborted early (failure_policy: fail-fast).");
            }
        }
        self.ctx.kv("Log", &report.log_file.display().to_string());
    }

    /// Print what a run would do without doing it.
    pub fn render_plan(&self, plan: &ProvisionPlan) {
        let paths = &plan.paths;
        self.ctx.header("Paths:");
        self.ctx.kv("Project     ", &paths.project_dir.display().to_string());
        self.ctx.kv("Log file    ", &paths.log_file.display().to_string());
        self.ctx.kv("Environment ", &paths.environment_dir.display().to_string());
        self.ctx.kv("Manifest    ", &paths.manifest.display().to_string());
        self.ctx.kv("Entry point ", &paths.entry_point.display().to_string());
        if !self.ctx.quiet {
            println!();
        }
        self.ctx.header("Steps:");
        for step in Step::ALL {
            let line = match plan.command_for(step, None) {
                Some(cmd) if step == Step::InstallDependencies || step == Step::Verify => {
                    format!("{cmd}  {}", "(environment interpreter once activated)".style(self.ctx.styles.dim))
                }
                Some(cmd) => cmd.to_string(),
                None => format!("use {}", plan.layout.interpreter.display()),
            };
            self.ctx.kv(&format!("{}. {step}", step.number()), &line);
        }
        self.ctx.kv("Policy", &plan.policy.to_string());
    }
}
