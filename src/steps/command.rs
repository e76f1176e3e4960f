//! Free-form shell command step from `[[commands]]`

use anyhow::Result;
use stepwise::{CheckOutcome, Step, StepContext};

use crate::process;

/// Run `apply` through `sh -c` unless `check` exits 0
///
/// Both run with the dotfiles directory as working directory.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    name: String,
    description: Option<String>,
    check: Option<String>,
    apply: String,
}

impl ShellCommand {
    pub fn new(name: impl Into<String>, apply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            check: None,
            apply: apply.into(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_check(mut self, check: Option<String>) -> Self {
        self.check = check;
        self
    }
}

impl Step for ShellCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Run `{}`", self.apply))
    }

    fn kind(&self) -> &'static str {
        "command"
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        let Some(check) = &self.check else {
            return Ok(CheckOutcome::pending_because("no check command, always runs"));
        };
        if process::succeeds(&process::shell(check), Some(&ctx.root))? {
            Ok(CheckOutcome::satisfied())
        } else {
            Ok(CheckOutcome::pending())
        }
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        process::run_checked(&process::shell(&self.apply), Some(&ctx.root))
    }

    fn uses_terminal(&self) -> bool {
        true
    }
}
