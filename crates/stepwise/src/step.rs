//! Step trait for idempotent provisioning
//!
//! A Step is one unit of provisioning work: it can tell whether its goal
//! state already holds, and it can bring that state about.

use crate::context::StepContext;
use crate::types::{CheckOutcome, OnFailure};
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Core trait for provisioning steps
///
/// Every step provides:
/// - Identity (name, description, kind)
/// - State detection (check)
/// - Convergence (apply)
/// - Run policy (confirmation, failure handling)
///
/// `check` must accurately reflect `apply`'s effect: after a successful
/// apply, the next check reports [`CheckOutcome::Satisfied`]. The runner
/// relies on this for idempotence but cannot enforce it.
///
/// # Example
///
/// ```ignore
/// use stepwise::{CheckOutcome, Step, StepContext};
///
/// #[derive(Debug)]
/// struct TouchFile {
///     path: std::path::PathBuf,
/// }
///
/// impl Step for TouchFile {
///     fn name(&self) -> &str {
///         "touch-file"
///     }
///
///     fn description(&self) -> String {
///         format!("Create {}", self.path.display())
///     }
///
///     fn check(&self, _ctx: &StepContext) -> anyhow::Result<CheckOutcome> {
///         if self.path.exists() {
///             Ok(CheckOutcome::satisfied())
///         } else {
///             Ok(CheckOutcome::pending())
///         }
///     }
///
///     fn apply(&self, _ctx: &mut StepContext) -> anyhow::Result<()> {
///         std::fs::write(&self.path, "")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Step: Send + Sync + fmt::Debug {
    /// Name of this step, unique within a plan
    ///
    /// Examples: "install-packages", "symlink-zsh-config"
    fn name(&self) -> &str;

    /// Human-readable description shown before confirmation
    fn description(&self) -> String;

    /// Step kind, used for grouping in listings
    ///
    /// Examples: "packages", "symlink", "stow", "command"
    fn kind(&self) -> &'static str {
        "step"
    }

    /// Report whether the goal state already holds
    ///
    /// Must not mutate anything.
    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome>;

    /// Bring about the goal state
    fn apply(&self, ctx: &mut StepContext) -> Result<()>;

    /// Whether the operator must confirm this step in interactive runs
    ///
    /// Read-only inspection steps return false.
    fn requires_confirmation(&self) -> bool {
        true
    }

    /// What the runner does with the rest of the plan if this step fails
    fn on_failure(&self) -> OnFailure {
        OnFailure::Abort
    }

    /// Existing user state this step's apply would overwrite
    ///
    /// The runner backs up every listed path that exists and is not a
    /// symlink before calling `apply`.
    fn overwrites(&self, _ctx: &StepContext) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Remediation hint shown when this step fails
    fn remediation(&self) -> Option<String> {
        None
    }

    /// Whether apply talks to the terminal itself (password prompts,
    /// package manager output), so progress output must stay out of its way
    fn uses_terminal(&self) -> bool {
        false
    }
}

/// A boxed step for type-erased storage
pub type BoxedStep = Box<dyn Step>;

impl<S: Step + ?Sized> Step for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        (**self).check(ctx)
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        (**self).apply(ctx)
    }

    fn requires_confirmation(&self) -> bool {
        (**self).requires_confirmation()
    }

    fn on_failure(&self) -> OnFailure {
        (**self).on_failure()
    }

    fn overwrites(&self, ctx: &StepContext) -> Vec<PathBuf> {
        (**self).overwrites(ctx)
    }

    fn remediation(&self) -> Option<String> {
        (**self).remediation()
    }

    fn uses_terminal(&self) -> bool {
        (**self).uses_terminal()
    }
}

/// Per-plan overrides for a step's run policy
///
/// Wraps any step and replaces its confirmation and failure policy
/// without touching its check or apply.
#[derive(Debug)]
pub struct WithPolicy<S> {
    inner: S,
    requires_confirmation: Option<bool>,
    on_failure: Option<OnFailure>,
}

impl<S: Step> WithPolicy<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            requires_confirmation: None,
            on_failure: None,
        }
    }

    pub fn require_confirmation(mut self, requires: bool) -> Self {
        self.requires_confirmation = Some(requires);
        self
    }

    pub fn failure_policy(mut self, policy: OnFailure) -> Self {
        self.on_failure = Some(policy);
        self
    }
}

impl<S: Step> Step for WithPolicy<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        self.inner.check(ctx)
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        self.inner.apply(ctx)
    }

    fn requires_confirmation(&self) -> bool {
        self.requires_confirmation
            .unwrap_or_else(|| self.inner.requires_confirmation())
    }

    fn on_failure(&self) -> OnFailure {
        self.on_failure.unwrap_or_else(|| self.inner.on_failure())
    }

    fn overwrites(&self, ctx: &StepContext) -> Vec<PathBuf> {
        self.inner.overwrites(ctx)
    }

    fn remediation(&self) -> Option<String> {
        self.inner.remediation()
    }

    fn uses_terminal(&self) -> bool {
        self.inner.uses_terminal()
    }
}
