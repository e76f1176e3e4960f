//! Execution engine - runs a plan step by step
//!
//! Steps run strictly in order on the calling thread. Every error is caught
//! at the step boundary and classified into the step's record; the caller
//! always gets a [`RunReport`] back, even when the run aborts.

use crate::backup::{self, BackupStore};
use crate::context::{Confirmer, NoProgress, ProgressCallback, StepContext};
use crate::error::Error;
use crate::plan::RunPlan;
use crate::step::Step;
use crate::types::{
    CheckOutcome, Halt, OnFailure, RunOptions, RunReport, StepRecord, StepResult,
};

/// Execute a plan with the given options and callbacks
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirmer type
///
/// # Arguments
/// * `plan` - The plan to run
/// * `opts` - Run options (interactive, dry_run, directories)
/// * `progress` - Progress callback
/// * `confirm` - Asked before each confirmable step when `opts.interactive`
///
/// # Returns
/// The report of every step that reached a terminal state
pub fn execute<P, C>(
    plan: &RunPlan,
    opts: &RunOptions,
    progress: &mut P,
    confirm: &mut C,
) -> RunReport
where
    P: ProgressCallback,
    C: Confirmer,
{
    let mut report = RunReport::new(opts.dry_run);
    let mut ctx = opts.step_context();

    if let Err(e) = plan.verify_preconditions(&ctx) {
        log::warn!("{e}");
        report.halt = Some(Halt::Precondition {
            message: match e {
                Error::PreconditionFailed { message } => message,
                other => other.to_string(),
            },
        });
        report.finish();
        progress.on_run_complete(&report);
        return report;
    }

    let backups = BackupStore::new(&opts.backup_root, &opts.home);
    let total = plan.len();
    progress.on_run_start(total);

    for (index, step) in plan.steps().iter().enumerate() {
        let step = step.as_ref();
        progress.on_step_start(index + 1, total, step);

        let record = run_step(step, opts, &mut ctx, &backups, progress, confirm);
        log::debug!("{}: {}", record.name, record.result.label());
        progress.on_step_complete(&record.name, &record.result);

        let abort = record.result.is_failure() && step.on_failure() == OnFailure::Abort;
        report.push(record);

        if abort {
            log::warn!("Aborting run after '{}' failed", step.name());
            report.halt = Some(Halt::StepAborted {
                step: step.name().to_string(),
            });
            break;
        }
    }

    report.finish();
    progress.on_run_complete(&report);
    report
}

/// Drive one step from Pending to a terminal state
fn run_step<P, C>(
    step: &dyn Step,
    opts: &RunOptions,
    ctx: &mut StepContext,
    backups: &BackupStore,
    progress: &mut P,
    confirm: &mut C,
) -> StepRecord
where
    P: ProgressCallback,
    C: Confirmer,
{
    let name = step.name().to_string();
    let fail = |err: Error| {
        log::warn!("{err}");
        StepResult::failed(&err, step.remediation())
    };

    match step.check(ctx) {
        Ok(CheckOutcome::Satisfied { detail }) => {
            return StepRecord::new(name, StepResult::Satisfied { detail });
        }
        Ok(CheckOutcome::Pending { detail }) => {
            if let Some(detail) = detail {
                log::debug!("{name}: pending ({detail})");
            }
        }
        Err(e) => {
            let err = Error::StepCheck {
                step: name.clone(),
                message: format!("{e:#}"),
            };
            return StepRecord::new(name, fail(err));
        }
    }

    if opts.interactive && step.requires_confirmation() {
        match confirm.confirm(&step.description()) {
            Ok(true) => {}
            Ok(false) => return StepRecord::new(name, StepResult::declined()),
            Err(e) => {
                let err = Error::Prompt {
                    message: format!("{e:#}"),
                };
                return StepRecord::new(name, fail(err));
            }
        }
    }

    if opts.dry_run {
        return StepRecord::new(
            name,
            StepResult::Skipped {
                reason: "dry run".to_string(),
            },
        );
    }

    let mut record = StepRecord::new(name, StepResult::Applied);

    // Never apply over user state that could not be captured first
    for path in step.overwrites(ctx) {
        match backup::needs_backup(&path) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                record.result = fail(Error::Backup {
                    path,
                    message: format!("cannot inspect: {e}"),
                });
                return record;
            }
        }
        match backups.capture(&path) {
            Ok(backup) => record.backups.push(backup),
            Err(err) => {
                record.result = fail(err);
                return record;
            }
        }
    }

    progress.on_apply_start(step);
    if let Err(e) = step.apply(ctx) {
        record.result = fail(Error::StepApply {
            step: record.name.clone(),
            message: format!("{e:#}"),
        });
    }

    record
}

/// Run a plan without progress reporting
///
/// For callers (tests, wrapper tools) that only need the report.
pub fn run<C: Confirmer>(plan: &RunPlan, opts: &RunOptions, confirm: &mut C) -> RunReport {
    execute(plan, opts, &mut NoProgress, confirm)
}
