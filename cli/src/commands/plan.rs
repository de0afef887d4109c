//! `envstrap plan`: show what a run would do.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service::ConfigOverrides;
use crate::domain::plan::Step;
use crate::output::json;

/// Run `envstrap plan`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub fn run(app: &AppContext) -> Result<()> {
    let config = app.load_config(&ConfigOverrides::default())?;
    let plan = app.plan(&config);

    if app.is_json() {
        let steps: Vec<_> = Step::ALL
            .iter()
            .map(|&step| {
                serde_json::json!({
                    "step": step,
                    "command": plan.command_for(step, None).map(|c| c.to_string()),
                })
            })
            .collect();
        let value = serde_json::json!({
            "paths": plan.paths,
            "environment_interpreter": plan.layout.interpreter,
            "failure_policy": plan.policy,
            "recreate": plan.recreate,
            "steps": steps,
        });
        println!("{}", json::to_pretty(&value)?);
        return Ok(());
    }

    app.human().render_plan(&plan);
    Ok(())
}
