//! Run plans - ordered steps plus the preconditions that guard them

use std::collections::HashSet;
use std::fmt;

use crate::context::StepContext;
use crate::error::{Error, Result};
use crate::step::{BoxedStep, Step};

/// Something that must hold before any step runs
pub trait Precondition: Send + Sync + fmt::Debug {
    /// Short description for listings
    fn description(&self) -> String;

    /// Verify the precondition, describing the problem on failure
    fn verify(&self, ctx: &StepContext) -> anyhow::Result<()>;
}

/// An ordered, immutable list of steps for one run
///
/// Order is significant: later steps may assume earlier ones succeeded.
#[derive(Debug, Default)]
pub struct RunPlan {
    steps: Vec<BoxedStep>,
    preconditions: Vec<Box<dyn Precondition>>,
}

impl RunPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, rejecting duplicate names
    pub fn push(&mut self, step: BoxedStep) -> Result<()> {
        if self.steps.iter().any(|s| s.name() == step.name()) {
            return Err(Error::DuplicateStep(step.name().to_string()));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Builder form of [`push`](Self::push)
    pub fn with_step(mut self, step: impl Step + 'static) -> Result<Self> {
        self.push(Box::new(step))?;
        Ok(self)
    }

    pub fn add_precondition(&mut self, precondition: Box<dyn Precondition>) {
        self.preconditions.push(precondition);
    }

    pub fn steps(&self) -> &[BoxedStep] {
        &self.steps
    }

    pub fn preconditions(&self) -> &[Box<dyn Precondition>] {
        &self.preconditions
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every precondition in order, stopping at the first failure
    pub fn verify_preconditions(&self, ctx: &StepContext) -> Result<()> {
        for precondition in &self.preconditions {
            precondition
                .verify(ctx)
                .map_err(|e| Error::PreconditionFailed {
                    message: format!("{e:#}"),
                })?;
        }
        Ok(())
    }

    /// Keep only the named steps (if any) and drop the skipped ones
    ///
    /// Relative order is preserved. Unknown names are an error so a typo
    /// never silently turns into an empty run.
    pub fn select(self, only: &[String], skip: &[String]) -> Result<Self> {
        let known: HashSet<&str> = self.steps.iter().map(|s| s.name()).collect();
        if let Some(unknown) = only
            .iter()
            .chain(skip.iter())
            .find(|n| !known.contains(n.as_str()))
        {
            return Err(Error::UnknownStep(unknown.clone()));
        }

        let steps = self
            .steps
            .into_iter()
            .filter(|s| only.is_empty() || only.iter().any(|n| n == s.name()))
            .filter(|s| !skip.iter().any(|n| n == s.name()))
            .collect();

        Ok(Self {
            steps,
            preconditions: self.preconditions,
        })
    }
}

/// Parse a comma-separated step list like "packages,shell"
pub fn parse_list(list: Option<&str>) -> Vec<String> {
    list.map(|l| {
        l.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
