use anyhow::Result;
use stepwise::survey_plan;

use super::{load_config, run_options, selected_plan};
use crate::Context;
use crate::engine::summary;
use crate::ui;

/// Check every step in parallel and print what `apply` would do
pub fn run(ctx: &Context, jobs: usize) -> Result<()> {
    let config = load_config(ctx)?;
    let plan = selected_plan(&config, None, None)?;
    let step_ctx = run_options(&config)?.step_context();

    if let Err(e) = plan.verify_preconditions(&step_ctx) {
        ui::warn(&format!("apply would stop here: {e}"));
    }

    let surveys = survey_plan(&plan, &step_ctx, jobs)?;
    summary::print_surveys(&surveys);
    Ok(())
}
