//! Git submodules inside the dotfiles tree

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use stepwise::{CheckOutcome, Step, StepContext};

use crate::process;

/// Initialise and fetch the dotfiles repository's submodules
#[derive(Debug, Clone)]
pub struct GitSubmodules {
    name: String,
    git: String,
    /// Submodule paths relative to the dotfiles dir; empty means every
    /// submodule `.gitmodules` declares
    paths: Vec<PathBuf>,
}

impl GitSubmodules {
    pub fn new(name: impl Into<String>, git: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            git: git.into(),
            paths,
        }
    }

    fn declared(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !self.paths.is_empty() {
            return Ok(self.paths.clone());
        }
        let gitmodules = root.join(".gitmodules");
        if !gitmodules.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&gitmodules)
            .with_context(|| format!("Failed to read {}", gitmodules.display()))?;
        Ok(parse_gitmodules(&content))
    }

    fn missing(&self, root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .declared(root)?
            .into_iter()
            .filter(|path| !is_populated(&root.join(path)))
            .collect())
    }
}

/// Submodule paths from `.gitmodules` content
pub fn parse_gitmodules(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            (key.trim() == "path").then(|| PathBuf::from(value.trim()))
        })
        .collect()
}

/// A checked-out submodule is a directory with at least one entry
fn is_populated(dir: &Path) -> bool {
    fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}

impl Step for GitSubmodules {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        "Fetch the dotfiles submodules".to_string()
    }

    fn kind(&self) -> &'static str {
        "submodules"
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        let declared = self.declared(&ctx.root)?;
        if declared.is_empty() {
            return Ok(CheckOutcome::satisfied_because("no submodules declared"));
        }

        let missing = self.missing(&ctx.root)?;
        if missing.is_empty() {
            Ok(CheckOutcome::satisfied_because(format!(
                "{} submodules checked out",
                declared.len()
            )))
        } else {
            let names: Vec<_> = missing.iter().map(|p| p.display().to_string()).collect();
            Ok(CheckOutcome::pending_because(format!(
                "not checked out: {}",
                names.join(", ")
            )))
        }
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let mut argv = vec![self.git.clone()];
        argv.extend(["submodule", "update", "--init", "--recursive"].map(String::from));
        if !self.paths.is_empty() {
            argv.push("--".to_string());
            argv.extend(self.paths.iter().map(|p| p.display().to_string()));
        }

        process::run_capture(&argv, Some(&ctx.root))?;

        let missing = self.missing(&ctx.root)?;
        if !missing.is_empty() {
            anyhow::bail!("{} still empty after update", missing[0].display());
        }
        Ok(())
    }

    fn remediation(&self) -> Option<String> {
        Some("check network access and the submodule URLs in .gitmodules".to_string())
    }
}
