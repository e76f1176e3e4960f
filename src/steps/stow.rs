//! GNU stow group step
//!
//! `stow --no --verbose` simulates the run: each planned change is printed
//! as `LINK:`, `UNLINK:` or `MKDIR:`, and conflicts with existing files are
//! listed as `* ...` lines with a non-zero exit.

use anyhow::{Result, bail};
use std::path::PathBuf;
use stepwise::{CheckOutcome, OnFailure, Step, StepContext};

use crate::process;

/// Stow one package directory of the dotfiles tree into a target dir
#[derive(Debug, Clone)]
pub struct StowGroup {
    name: String,
    group: String,
    /// Defaults to the home directory
    target: Option<PathBuf>,
    program: String,
}

/// What a stow simulation would do
#[derive(Debug, Default, PartialEq)]
pub struct Simulation {
    pub operations: usize,
    pub conflicts: Vec<String>,
}

/// Parse the stderr of `stow --no --verbose=1`
pub fn parse_simulation(stderr: &str) -> Simulation {
    let mut sim = Simulation::default();
    for line in stderr.lines().map(str::trim) {
        if let Some(conflict) = line.strip_prefix("* ") {
            sim.conflicts.push(conflict.trim().to_string());
        } else if ["LINK:", "UNLINK:", "MKDIR:", "RMDIR:"]
            .iter()
            .any(|op| line.starts_with(op))
        {
            sim.operations += 1;
        }
    }
    sim
}

impl StowGroup {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            target: None,
            program: "stow".to_string(),
        }
    }

    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn argv(&self, ctx: &StepContext, simulate: bool) -> Vec<String> {
        let target = match &self.target {
            Some(t) => ctx.in_home(t),
            None => ctx.home.clone(),
        };
        let mut argv = vec![self.program.clone()];
        if simulate {
            argv.push("--no".to_string());
        }
        argv.extend([
            "--verbose=1".to_string(),
            "-d".to_string(),
            ctx.root.display().to_string(),
            "-t".to_string(),
            target.display().to_string(),
            self.group.clone(),
        ]);
        argv
    }

    fn conflict_error(&self, conflicts: &[String]) -> anyhow::Error {
        anyhow::anyhow!(
            "stowing {} would conflict with existing files: {}",
            self.group,
            conflicts.join("; ")
        )
    }
}

impl Step for StowGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("Stow the {} dotfiles", self.group)
    }

    fn kind(&self) -> &'static str {
        "stow"
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        if !ctx.root.join(&self.group).is_dir() {
            bail!("{} has no {} directory", ctx.root.display(), self.group);
        }

        let out = process::output(&self.argv(ctx, true), None)?;
        let sim = parse_simulation(&String::from_utf8_lossy(&out.stderr));

        if !sim.conflicts.is_empty() {
            return Err(self.conflict_error(&sim.conflicts));
        }
        if !out.status.success() {
            bail!("stow simulation failed: {}", process::stderr_tail(&out));
        }

        Ok(match sim.operations {
            0 => CheckOutcome::satisfied_because("all links in place"),
            1 => CheckOutcome::pending_because("1 change"),
            n => CheckOutcome::pending_because(format!("{n} changes")),
        })
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let out = process::output(&self.argv(ctx, false), None)?;
        if out.status.success() {
            return Ok(());
        }

        let sim = parse_simulation(&String::from_utf8_lossy(&out.stderr));
        if sim.conflicts.is_empty() {
            bail!("stow failed: {}", process::stderr_tail(&out));
        }
        Err(self.conflict_error(&sim.conflicts))
    }

    fn on_failure(&self) -> OnFailure {
        OnFailure::SkipAndContinue
    }

    fn remediation(&self) -> Option<String> {
        Some(format!(
            "move the conflicting files aside or adopt them with `stow --adopt {}`",
            self.group
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PENDING: &str = "\
LINK: .tmux.conf => .dotfiles/tmux/.tmux.conf
MKDIR: .config/tmux
LINK: .config/tmux/theme.conf => ../../.dotfiles/tmux/.config/tmux/theme.conf
WARNING: in simulation mode so not modifying filesystem.
";

    const CONFLICT: &str = "\
WARNING! stowing tmux would cause conflicts:
  * cannot stow .dotfiles/tmux/.tmux.conf over existing target .tmux.conf since neither a link nor a directory and --adopt not specified
All operations aborted.
";

    #[test]
    fn test_parse_pending() {
        let sim = parse_simulation(PENDING);
        assert_eq!(sim.operations, 3);
        assert!(sim.conflicts.is_empty());
    }

    #[test]
    fn test_parse_conflict() {
        let sim = parse_simulation(CONFLICT);
        assert_eq!(sim.operations, 0);
        assert_eq!(sim.conflicts.len(), 1);
        assert!(sim.conflicts[0].starts_with("cannot stow .dotfiles/tmux/.tmux.conf"));
    }

    #[test]
    fn test_parse_nothing_to_do() {
        let sim = parse_simulation("WARNING: in simulation mode so not modifying filesystem.\n");
        assert_eq!(sim, Simulation::default());
    }

    #[test]
    fn test_argv() {
        let ctx = StepContext::new("/home/me", "/home/me/.dotfiles");
        let step = StowGroup::new("stow-nvim", "nvim").target(".config");
        assert_eq!(
            step.argv(&ctx, true),
            [
                "stow",
                "--no",
                "--verbose=1",
                "-d",
                "/home/me/.dotfiles",
                "-t",
                "/home/me/.config",
                "nvim"
            ]
        );
        assert!(!step.argv(&ctx, false).contains(&"--no".to_string()));
    }

    #[test]
    fn test_missing_group_dir_is_check_error() {
        let tmp = TempDir::new().unwrap();
        let step = StowGroup::new("stow-tmux", "tmux");
        let err = step
            .check(&StepContext::new(tmp.path(), tmp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("no tmux directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_conflict_surfaces_as_check_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("tmux")).unwrap();
        let stow = tmp.path().join("fake-stow");
        fs::write(
            &stow,
            format!("#!/bin/sh\ncat >&2 <<'EOF'\n{CONFLICT}EOF\nexit 1\n"),
        )
        .unwrap();
        fs::set_permissions(&stow, fs::Permissions::from_mode(0o755)).unwrap();

        let step = StowGroup::new("stow-tmux", "tmux").program(stow.display().to_string());
        let err = step
            .check(&StepContext::new(tmp.path(), tmp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("would conflict"));
        assert!(step.remediation().unwrap().contains("--adopt"));
        assert_eq!(step.on_failure(), OnFailure::SkipAndContinue);
    }
}
