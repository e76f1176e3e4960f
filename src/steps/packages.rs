//! Package installation through an external package manager

use anyhow::{Result, bail};
use stepwise::{CheckOutcome, OnFailure, Step, StepContext};

use crate::process;

/// Install a list of packages with a configured manager
///
/// The manager is only ever invoked as an external process: `query` plus one
/// package name must exit 0 when that package is installed, and `install`
/// plus the missing names must install them.
#[derive(Debug, Clone)]
pub struct PackageInstall {
    name: String,
    manager: String,
    install: Vec<String>,
    query: Vec<String>,
    packages: Vec<String>,
    on_failure: OnFailure,
}

impl PackageInstall {
    pub fn new(
        name: impl Into<String>,
        manager: impl Into<String>,
        install: Vec<String>,
        query: Vec<String>,
        packages: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            manager: manager.into(),
            install,
            query,
            packages,
            on_failure: OnFailure::Abort,
        }
    }

    pub fn failure_policy(mut self, policy: OnFailure) -> Self {
        self.on_failure = policy;
        self
    }

    /// Packages the query command does not report as installed
    fn missing(&self) -> Result<Vec<&str>> {
        let mut missing = Vec::new();
        for package in &self.packages {
            let mut argv = self.query.clone();
            argv.push(package.clone());
            if !process::succeeds(&argv, None)? {
                missing.push(package.as_str());
            }
        }
        Ok(missing)
    }
}

impl Step for PackageInstall {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!(
            "Install {} packages with {}",
            self.packages.len(),
            self.manager
        )
    }

    fn kind(&self) -> &'static str {
        "packages"
    }

    fn check(&self, _ctx: &StepContext) -> Result<CheckOutcome> {
        let missing = self.missing()?;
        if missing.is_empty() {
            Ok(CheckOutcome::satisfied_because(format!(
                "{} packages installed",
                self.packages.len()
            )))
        } else {
            Ok(CheckOutcome::pending_because(format!(
                "missing: {}",
                missing.join(", ")
            )))
        }
    }

    fn apply(&self, _ctx: &mut StepContext) -> Result<()> {
        let missing = self.missing()?;
        if missing.is_empty() {
            return Ok(());
        }

        let mut argv = self.install.clone();
        argv.extend(missing.iter().map(|p| p.to_string()));
        process::run_checked(&argv, None)?;

        let still_missing = self.missing()?;
        if !still_missing.is_empty() {
            bail!(
                "{} reported success but these are still missing: {}",
                self.manager,
                still_missing.join(", ")
            );
        }
        Ok(())
    }

    fn on_failure(&self) -> OnFailure {
        self.on_failure
    }

    fn remediation(&self) -> Option<String> {
        Some(format!(
            "check the {} output above, or install the packages by hand with `{}`",
            self.manager,
            self.install.join(" ")
        ))
    }

    fn uses_terminal(&self) -> bool {
        true
    }
}
