use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use stepwise::{ProgressCallback, Step, StepResult};

use crate::ui;

/// Prints one line per step and spins while quiet applies run
///
/// Steps that own the terminal during apply (sudo prompts, package manager
/// output) get a plain "running" line instead of a spinner.
pub struct TerminalProgress {
    dry_run: bool,
    spinner: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            spinner: None,
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl ProgressCallback for TerminalProgress {
    fn on_run_start(&mut self, total: usize) {
        let title = if self.dry_run {
            format!("Dry run: checking {total} steps")
        } else {
            format!("Bootstrapping {total} steps")
        };
        ui::header(&title);
    }

    fn on_step_start(&mut self, index: usize, total: usize, step: &dyn Step) {
        ui::step(
            index,
            total,
            &format!("{} {}", step.name().bold(), step.description().dimmed()),
        );
    }

    fn on_apply_start(&mut self, step: &dyn Step) {
        if step.uses_terminal() {
            ui::dim(&format!("running {}...", step.name()));
        } else {
            self.spinner = Some(spinner(format!("applying {}", step.name())));
        }
    }

    fn on_step_complete(&mut self, name: &str, result: &StepResult) {
        self.stop_spinner();
        println!("{}", ui::status_line(name, result));
        if let StepResult::Failed {
            hint: Some(hint), ..
        } = result
        {
            println!("      {} {}", "hint:".dimmed(), hint);
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
