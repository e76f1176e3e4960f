use anyhow::Result;
use colored::Colorize;
use stepwise::{OnFailure, Step};

use super::{load_config, selected_plan};
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let plan = selected_plan(&config, None, None)?;

    ui::header("Bootstrap plan");
    let width = plan.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for (i, step) in plan.steps().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, step_line(step.as_ref(), width));
    }

    if !plan.preconditions().is_empty() {
        println!();
        println!("  {}", "Requires:".bold());
        for p in plan.preconditions() {
            println!("    • {}", p.description());
        }
    }
    Ok(())
}

fn step_line(step: &dyn Step, width: usize) -> String {
    let mut flags = Vec::new();
    if !step.requires_confirmation() {
        flags.push("no prompt");
    }
    if step.on_failure() == OnFailure::SkipAndContinue {
        flags.push("continues on failure");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "{:<width$}  {:<9} {}{}",
        step.name(),
        step.kind(),
        step.description().dimmed(),
        flags.yellow()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ShellCommand;
    use stepwise::WithPolicy;

    #[test]
    fn test_step_line_flags() {
        colored::control::set_override(false);
        let step = WithPolicy::new(ShellCommand::new("tpm", "true"))
            .require_confirmation(false)
            .failure_policy(OnFailure::SkipAndContinue);
        assert_eq!(
            step_line(&step, 5),
            "tpm    command   Run `true` [no prompt, continues on failure]"
        );

        let plain = ShellCommand::new("hi", "echo hi");
        assert_eq!(step_line(&plain, 2), "hi  command   Run `echo hi`");
    }
}
