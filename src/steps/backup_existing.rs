//! Move an existing file out of the way before something else takes its place

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use stepwise::{CheckOutcome, Step, StepContext};

use super::symlink::remove_path;
use super::tilde;

/// Clear a path under home, keeping a backup of what was there
///
/// The path is declared in `overwrites`, so the runner copies it into the
/// run's backup directory before `apply` removes it. A symlink or an absent
/// path needs nothing.
#[derive(Debug, Clone)]
pub struct BackupExisting {
    name: String,
    target: PathBuf,
}

impl BackupExisting {
    pub fn new(name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

impl Step for BackupExisting {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("Back up and remove the existing {}", tilde(&self.target))
    }

    fn kind(&self) -> &'static str {
        "backup"
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        let target = ctx.in_home(&self.target);
        match fs::symlink_metadata(&target) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(CheckOutcome::satisfied_because("nothing to back up"))
            }
            Err(e) => Err(e).with_context(|| format!("Cannot inspect {}", target.display())),
            Ok(meta) if meta.file_type().is_symlink() => {
                Ok(CheckOutcome::satisfied_because("already a symlink"))
            }
            Ok(_) => Ok(CheckOutcome::pending_because(
                "existing file will be moved to backups",
            )),
        }
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let target = ctx.in_home(&self.target);
        match fs::symlink_metadata(&target) {
            Ok(meta) if !meta.file_type().is_symlink() => remove_path(&target),
            _ => Ok(()),
        }
    }

    fn overwrites(&self, ctx: &StepContext) -> Vec<PathBuf> {
        vec![ctx.in_home(&self.target)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise::{AutoConfirm, FailureKind, RunOptions, RunPlan, StepResult, run};
    use tempfile::TempDir;

    #[test]
    fn test_absent_is_satisfied() {
        let tmp = TempDir::new().unwrap();
        let step = BackupExisting::new("backup-existing-zshrc", ".zshrc");
        let outcome = step.check(&StepContext::new(tmp.path(), tmp.path())).unwrap();
        assert_eq!(outcome.detail(), Some("nothing to back up"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_satisfied() {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("/nowhere", tmp.path().join(".zshrc")).unwrap();
        let step = BackupExisting::new("backup-existing-zshrc", ".zshrc");
        assert!(
            step.check(&StepContext::new(tmp.path(), tmp.path()))
                .unwrap()
                .is_satisfied()
        );
    }

    #[test]
    fn test_run_backs_up_then_removes() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).unwrap();
        fs::write(home.join(".zshrc"), "alias ll='ls -l'").unwrap();

        let plan = RunPlan::new()
            .with_step(BackupExisting::new("backup-existing-zshrc", ".zshrc"))
            .unwrap();
        let opts = RunOptions::new(&home, home.join(".dotfiles"), tmp.path().join("backups"));

        let report = run(&plan, &opts, &mut AutoConfirm);

        assert_eq!(report.results(), [&StepResult::Applied]);
        assert!(!home.join(".zshrc").exists());
        let backup = &report.records[0].backups[0];
        assert_eq!(
            fs::read_to_string(&backup.backup).unwrap(),
            "alias ll='ls -l'"
        );

        // second run has nothing left to do
        let again = run(&plan, &opts, &mut AutoConfirm);
        assert!(matches!(again.results()[0], StepResult::Satisfied { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_uninspectable_target_fails_the_check() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).unwrap();
        std::os::unix::fs::symlink("loop", home.join("loop")).unwrap();

        let plan = RunPlan::new()
            .with_step(BackupExisting::new("backup-existing-zshrc", "loop/.zshrc"))
            .unwrap();
        let opts = RunOptions::new(&home, home.join(".dotfiles"), tmp.path().join("backups"));

        let report = run(&plan, &opts, &mut AutoConfirm);

        assert!(matches!(
            report.results()[0],
            StepResult::Failed {
                kind: FailureKind::Check,
                ..
            }
        ));
        assert!(!tmp.path().join("backups").exists());
    }
}
