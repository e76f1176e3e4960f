//! Core types for provisioning runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::context::StepContext;
use crate::error::Error;

/// What happens to the rest of the run when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnFailure {
    /// Stop the run and return the partial report
    #[default]
    Abort,
    /// Record the failure and move on to the next step
    SkipAndContinue,
}

/// Result of checking whether a step's goal state already holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// Goal state holds, nothing to do
    Satisfied { detail: Option<String> },
    /// Goal state does not hold yet
    Pending { detail: Option<String> },
}

impl CheckOutcome {
    pub fn satisfied() -> Self {
        Self::Satisfied { detail: None }
    }

    pub fn satisfied_because(detail: impl Into<String>) -> Self {
        Self::Satisfied {
            detail: Some(detail.into()),
        }
    }

    pub fn pending() -> Self {
        Self::Pending { detail: None }
    }

    pub fn pending_because(detail: impl Into<String>) -> Self {
        Self::Pending {
            detail: Some(detail.into()),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Satisfied { detail } | Self::Pending { detail } => detail.as_deref(),
        }
    }
}

/// Stage at which a step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Check,
    Prompt,
    Backup,
    Apply,
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// Already in the goal state; no mutation happened
    Satisfied { detail: Option<String> },
    /// The step's effect was applied
    Applied,
    /// The step was not applied (declined, dry run)
    Skipped { reason: String },
    /// The step failed at `kind`
    Failed {
        kind: FailureKind,
        error: String,
        hint: Option<String>,
    },
}

impl StepResult {
    /// The result recorded when the operator answers no
    pub fn declined() -> Self {
        Self::Skipped {
            reason: Error::UserDeclined.to_string(),
        }
    }

    /// Build a failure from a classified error
    pub fn failed(err: &Error, hint: Option<String>) -> Self {
        Self::Failed {
            kind: err.failure_kind().unwrap_or(FailureKind::Apply),
            error: err.to_string(),
            hint,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Check if the result leaves the step's goal state in place
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Satisfied { .. } | Self::Applied)
    }

    /// Short lowercase label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Satisfied { .. } => "satisfied",
            Self::Applied => "applied",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A copy of user state captured before it was overwritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// One line of the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub result: StepResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backups: Vec<BackupRecord>,
}

impl StepRecord {
    pub fn new(name: impl Into<String>, result: StepResult) -> Self {
        Self {
            name: name.into(),
            result,
            backups: Vec::new(),
        }
    }
}

/// Why a run stopped before reaching the end of its plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// A precondition failed; no step ran
    Precondition { message: String },
    /// A step with `OnFailure::Abort` failed
    StepAborted { step: String },
}

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Every step ran and none failed
    Converged,
    /// Every step ran but some failed and were skipped past
    CompletedWithFailures,
    /// The run stopped early
    Aborted,
}

/// Counts of step outcomes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub satisfied: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Add a result to the summary
    pub fn add_result(&mut self, result: &StepResult) {
        match result {
            StepResult::Satisfied { .. } => self.satisfied += 1,
            StepResult::Applied => self.applied += 1,
            StepResult::Skipped { .. } => self.skipped += 1,
            StepResult::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.satisfied + self.applied + self.skipped + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Ordered outcomes of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub records: Vec<StepRecord>,
    pub halt: Option<Halt>,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            records: Vec::new(),
            halt: None,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for record in &self.records {
            summary.add_result(&record.result);
        }
        summary
    }

    pub fn status(&self) -> RunStatus {
        if self.halt.is_some() {
            RunStatus::Aborted
        } else if self.records.iter().any(|r| r.result.is_failure()) {
            RunStatus::CompletedWithFailures
        } else {
            RunStatus::Converged
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == RunStatus::Converged
    }

    /// Look up the result recorded for a step
    pub fn result_for(&self, name: &str) -> Option<&StepResult> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.result)
    }

    /// Results in plan order
    pub fn results(&self) -> Vec<&StepResult> {
        self.records.iter().map(|r| &r.result).collect()
    }

    /// All backups captured during the run
    pub fn backups(&self) -> impl Iterator<Item = &BackupRecord> {
        self.records.iter().flat_map(|r| r.backups.iter())
    }

    /// Next-action guidance for an aborted run
    pub fn guidance(&self) -> Option<String> {
        match self.halt.as_ref()? {
            Halt::Precondition { message } => {
                Some(format!("Resolve the precondition ({message}) then re-run"))
            }
            Halt::StepAborted { step } => {
                let hint = self.records.iter().find(|r| &r.name == step).and_then(|r| {
                    match &r.result {
                        StepResult::Failed { hint, .. } => hint.clone(),
                        _ => None,
                    }
                });
                Some(match hint {
                    Some(hint) => format!("Resolve '{step}' ({hint}) then re-run"),
                    None => format!("Resolve '{step}' then re-run"),
                })
            }
        }
    }
}

/// Options for a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ask before applying steps that require confirmation
    pub interactive: bool,
    /// Check and confirm, but never back up or apply
    pub dry_run: bool,
    /// Home directory steps and backups are relative to
    pub home: PathBuf,
    /// Directory relative step paths resolve against
    pub root: PathBuf,
    /// Directory holding one `<timestamp>` subdirectory per run with backups
    pub backup_root: PathBuf,
}

impl RunOptions {
    pub fn new(
        home: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        backup_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            interactive: false,
            dry_run: false,
            home: home.into(),
            root: root.into(),
            backup_root: backup_root.into(),
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The context steps see during this run
    pub fn step_context(&self) -> StepContext {
        StepContext {
            home: self.home.clone(),
            root: self.root.clone(),
        }
    }
}
