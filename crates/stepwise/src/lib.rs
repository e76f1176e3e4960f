//! # Stepwise
//!
//! An idempotent, confirmable provisioning-step runner.
//!
//! This crate provides the core abstractions for bootstrapping a machine as
//! an ordered list of steps that each know whether their work is already
//! done.
//!
//! ## Core Concepts
//!
//! - **Step**: one unit of provisioning work with a `check` and an `apply`
//! - **RunPlan**: ordered, immutable list of steps plus preconditions
//! - **RunReport**: ordered outcomes of executing a plan
//! - **BackupStore**: timestamped copies of user state about to be overwritten
//!
//! ## Run Semantics
//!
//! For each step, in order:
//!
//! 1. `check` - already satisfied steps are recorded and skipped
//! 2. confirm - interactive runs ask before confirmable steps; anything but
//!    an explicit yes skips the step
//! 3. backup - existing, non-symlink paths the step overwrites are copied
//!    into the run's backup directory; a failed backup fails the step
//! 4. `apply` - errors are caught and recorded, never propagated
//! 5. policy - `OnFailure::Abort` ends the run, `SkipAndContinue` moves on
//!
//! There is no rollback. Runs are single-threaded and assume a single
//! instance works on a given home directory at a time.
//!
//! ## Example
//!
//! ```ignore
//! use stepwise::{AutoConfirm, RunOptions, RunPlan, run};
//!
//! let mut plan = RunPlan::new();
//! plan.push(Box::new(MyStep::new()))?;
//!
//! let opts = RunOptions::new(home, home.join(".dotfiles"), state.join("backups"));
//! let report = run(&plan, &opts, &mut AutoConfirm);
//! println!("{:?}", report.summary());
//! ```
//!
//! ## Provider Traits
//!
//! - [`Confirmer`]: asks the operator yes/no questions
//! - [`ProgressCallback`]: receives per-step progress
//! - [`Precondition`]: guards a whole run

pub mod backup;
pub mod context;
pub mod error;
pub mod plan;
pub mod runner;
pub mod step;
pub mod survey;
pub mod types;

// Re-export main types at crate root
pub use backup::{BackupSet, BackupStore};
pub use context::{
    AutoConfirm, AutoDecline, Confirmer, LineConfirmer, NoProgress, ProgressCallback, Scripted,
    StepContext,
};
pub use error::{Error, Result};
pub use plan::{Precondition, RunPlan, parse_list};
pub use runner::{execute, run};
pub use step::{BoxedStep, Step, WithPolicy};
pub use survey::{Survey, SurveySummary, survey_plan};
pub use types::{
    BackupRecord, CheckOutcome, FailureKind, Halt, OnFailure, RunOptions, RunReport, RunStatus,
    RunSummary, StepRecord, StepResult,
};
