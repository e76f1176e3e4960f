//! Build the run plan from configuration
//!
//! The stock plan, in order:
//!
//! 1. `install-packages` - repository packages
//! 2. `install-aur-packages` - AUR packages (skip-and-continue)
//! 3. `clone-dotfiles-submodules`
//! 4. `backup-existing-zshrc` - move a hand-written rc file aside
//! 5. `symlink-zsh-config` - link the rc file into the dotfiles tree
//! 6. `stow-<group>` - one per `[[stow]]` group (skip-and-continue)
//! 7. one step per `[[links]]` and `[[commands]]` entry
//! 8. `change-shell` (skip-and-continue)

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stepwise::{OnFailure, RunPlan, Step, WithPolicy};

use crate::config::{Config, PackagesConfig, PolicyConfig};
use crate::steps::{
    BackupExisting, CommandAvailable, DotfilesPresent, GitSubmodules, LoginShell, NotRoot,
    PackageInstall, ShellCommand, StowGroup, Symlink,
};

/// Collects steps, applying `[steps.policy]` overrides as they are added
struct Builder<'a> {
    plan: RunPlan,
    policy: &'a BTreeMap<String, PolicyConfig>,
}

impl Builder<'_> {
    fn add<S: Step + 'static>(&mut self, step: S) -> Result<()> {
        let mut step = WithPolicy::new(step);
        if let Some(policy) = self.policy.get(step.name()) {
            if let Some(confirm) = policy.confirm {
                step = step.require_confirmation(confirm);
            }
            if let Some(on_failure) = policy.on_failure {
                step = step.failure_policy(on_failure);
            }
        }
        self.plan.push(Box::new(step))?;
        Ok(())
    }

    fn finish(self) -> Result<RunPlan> {
        let names = self.plan.names();
        if let Some(unknown) = self.policy.keys().find(|k| !names.contains(&k.as_str())) {
            anyhow::bail!("[steps.policy] refers to unknown step '{unknown}'");
        }
        Ok(self.plan)
    }
}

/// The full plan for `config`, guarded by the run preconditions
pub fn build(config: &Config, user: Option<&str>) -> Result<RunPlan> {
    let mut plan = steps(config, user)?;
    plan.add_precondition(Box::new(NotRoot));
    plan.add_precondition(Box::new(DotfilesPresent));
    if config.packages.is_active() {
        plan.add_precondition(Box::new(CommandAvailable {
            program: config.packages.manager().to_string(),
        }));
    }
    Ok(plan)
}

/// Just the steps for `config`, in run order
pub fn steps(config: &Config, user: Option<&str>) -> Result<RunPlan> {
    let mut b = Builder {
        plan: RunPlan::new(),
        policy: &config.steps.policy,
    };

    if config.packages.is_active() {
        b.add(packages("install-packages", &config.packages))?;
    }

    let aur = PackagesConfig::from(&config.aur);
    if aur.is_active() {
        b.add(
            packages("install-aur-packages", &aur).failure_policy(OnFailure::SkipAndContinue),
        )?;
    }

    let dotfiles = &config.dotfiles;
    b.add(GitSubmodules::new(
        "clone-dotfiles-submodules",
        &dotfiles.git,
        dotfiles.submodules.iter().map(PathBuf::from).collect(),
    ))?;

    if !config.shell.rc_file.is_empty() {
        let (backup, link) = rc_step_names(&config.shell.rc_file);
        b.add(BackupExisting::new(backup, &config.shell.rc_file))?;
        b.add(Symlink::new(
            link,
            &config.shell.rc_source,
            &config.shell.rc_file,
        ))?;
    }

    for stow in &config.stow {
        let mut step = StowGroup::new(format!("stow-{}", stow.group), &stow.group);
        if let Some(target) = &stow.target {
            step = step.target(crate::paths::expand(target));
        }
        b.add(step)?;
    }

    for link in &config.links {
        b.add(Symlink::new(&link.name, &link.source, &link.target))?;
    }

    for command in &config.commands {
        b.add(
            WithPolicy::new(
                ShellCommand::new(&command.name, &command.apply)
                    .with_description(command.description.clone())
                    .with_check(command.check.clone()),
            )
            .require_confirmation(command.confirm)
            .failure_policy(command.on_failure),
        )?;
    }

    if !config.shell.login.is_empty() {
        match user {
            Some(user) => b.add(LoginShell::new("change-shell", &config.shell.login, user))?,
            None => log::warn!("Cannot tell the current user; leaving the login shell alone"),
        }
    }

    b.finish()
}

fn packages(name: &str, config: &PackagesConfig) -> PackageInstall {
    PackageInstall::new(
        name,
        config.manager(),
        config.install.clone(),
        config.query.clone(),
        config.names.clone(),
    )
}

/// `.zshrc` -> (`backup-existing-zshrc`, `symlink-zsh-config`)
fn rc_step_names(rc_file: &str) -> (String, String) {
    let stem = Path::new(rc_file)
        .file_name()
        .map(|n| n.to_string_lossy().trim_start_matches('.').to_string())
        .unwrap_or_default();
    let shell = stem
        .strip_suffix("rc")
        .filter(|s| !s.is_empty())
        .unwrap_or(&stem);
    (
        format!("backup-existing-{stem}"),
        format!("symlink-{shell}-config"),
    )
}

/// The user whose login shell `change-shell` manages
pub fn current_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}
