//! Apply command - walk the plan and converge the machine
//!
//! Every step is checked first; only pending steps are confirmed, backed
//! up and applied. Re-running after a successful apply changes nothing.

use anyhow::{Context, Result};
use stepwise::{NoProgress, RunOptions, RunReport, RunStatus, execute};

use super::{load_config, run_options, selected_plan};
use crate::Context as AppContext;
use crate::cli::ApplyArgs;
use crate::engine::{TerminalConfirmer, TerminalProgress, summary};
use crate::{history, paths, ui};

pub fn run(ctx: &AppContext, args: ApplyArgs) -> Result<()> {
    let config = load_config(ctx)?;
    let plan = selected_plan(&config, args.only.as_deref(), args.skip.as_deref())?;

    if plan.is_empty() {
        ui::warn("No steps selected");
        return Ok(());
    }

    let opts = with_flags(run_options(&config)?, &args);
    log::info!(
        "Dotfiles at {}, backups under {}",
        opts.root.display(),
        opts.backup_root.display()
    );

    let mut confirmer = TerminalConfirmer::detect();
    let report = if args.json || ctx.quiet {
        execute(&plan, &opts, &mut NoProgress, &mut confirmer)
    } else {
        execute(
            &plan,
            &opts,
            &mut TerminalProgress::new(args.dry_run),
            &mut confirmer,
        )
    };

    if !report.dry_run {
        record(&report);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else if !ctx.quiet {
        summary::print_report(&report);
    }

    match report.status() {
        RunStatus::Converged => Ok(()),
        RunStatus::CompletedWithFailures => {
            anyhow::bail!("{} step(s) failed", report.summary().failed)
        }
        RunStatus::Aborted => anyhow::bail!("Run aborted"),
    }
}

/// Prompts only make sense when something could be applied
fn with_flags(opts: RunOptions, args: &ApplyArgs) -> RunOptions {
    opts.interactive(!args.yes && !args.dry_run)
        .dry_run(args.dry_run)
}

/// Keep the report for `dotstrap last`; losing it never fails the run
fn record(report: &RunReport) {
    let saved = paths::last_run_file().and_then(|path| history::save(report, &path));
    if let Err(e) = saved {
        log::warn!("Could not save run report: {e:#}");
    }
}
