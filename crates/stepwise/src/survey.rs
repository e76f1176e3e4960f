//! Read-only survey of a plan's steps
//!
//! A survey only calls `check`, which never mutates, so unlike a run it can
//! fan out across a thread pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::StepContext;
use crate::error::{Error, Result};
use crate::plan::RunPlan;
use crate::step::Step;
use crate::types::CheckOutcome;

/// What a step's check reported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub requires_confirmation: bool,
    /// The check's outcome, or its error chain
    pub outcome: std::result::Result<CheckOutcome, String>,
}

impl Survey {
    pub fn from_step(step: &dyn Step, ctx: &StepContext) -> Self {
        Self {
            name: step.name().to_string(),
            kind: step.kind().to_string(),
            description: step.description(),
            requires_confirmation: step.requires_confirmation(),
            outcome: step.check(ctx).map_err(|e| format!("{e:#}")),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self.outcome, Ok(CheckOutcome::Satisfied { .. }))
    }
}

/// Check every step of `plan` on a pool of `jobs` threads
///
/// Results come back in plan order.
pub fn survey_plan(plan: &RunPlan, ctx: &StepContext, jobs: usize) -> Result<Vec<Survey>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| Error::Other(format!("Failed to create thread pool: {e}")))?;

    Ok(pool.install(|| {
        plan.steps()
            .par_iter()
            .map(|step| Survey::from_step(step.as_ref(), ctx))
            .collect()
    }))
}

/// Survey summary statistics
#[derive(Debug, Clone, Default)]
pub struct SurveySummary {
    pub satisfied: usize,
    pub pending: usize,
    pub errors: usize,
}

impl SurveySummary {
    pub fn from_surveys(surveys: &[Survey]) -> Self {
        let mut summary = Self::default();
        for survey in surveys {
            match survey.outcome {
                Ok(CheckOutcome::Satisfied { .. }) => summary.satisfied += 1,
                Ok(CheckOutcome::Pending { .. }) => summary.pending += 1,
                Err(_) => summary.errors += 1,
            }
        }
        summary
    }

    /// Check if a run would change anything
    pub fn has_work(&self) -> bool {
        self.pending > 0 || self.errors > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed {
        name: &'static str,
        outcome: Option<bool>,
    }

    impl Step for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> String {
            format!("Fixed {}", self.name)
        }

        fn check(&self, _ctx: &StepContext) -> anyhow::Result<CheckOutcome> {
            match self.outcome {
                Some(true) => Ok(CheckOutcome::satisfied()),
                Some(false) => Ok(CheckOutcome::pending_because("missing")),
                None => anyhow::bail!("cannot tell"),
            }
        }

        fn apply(&self, _ctx: &mut StepContext) -> anyhow::Result<()> {
            anyhow::bail!("a survey must never apply")
        }
    }

    #[test]
    fn test_survey_keeps_order_and_counts() {
        let plan = RunPlan::new()
            .with_step(Fixed {
                name: "a",
                outcome: Some(true),
            })
            .and_then(|p| {
                p.with_step(Fixed {
                    name: "b",
                    outcome: Some(false),
                })
            })
            .and_then(|p| {
                p.with_step(Fixed {
                    name: "c",
                    outcome: None,
                })
            })
            .unwrap();

        let surveys = survey_plan(&plan, &StepContext::new("/h", "/h/.dotfiles"), 4).unwrap();
        let names: Vec<_> = surveys.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(surveys[0].is_satisfied());
        assert_eq!(surveys[2].outcome.as_ref().unwrap_err(), "cannot tell");

        let summary = SurveySummary::from_surveys(&surveys);
        assert_eq!(summary.satisfied, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.has_work());
    }
}
