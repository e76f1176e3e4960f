//! Checks that guard a whole run

use anyhow::{Result, bail};
use stepwise::{Precondition, StepContext};

use crate::process;

/// Refuse to run as root
///
/// Everything lands in the invoking user's home; privileged commands go
/// through `sudo` themselves.
#[derive(Debug)]
pub struct NotRoot;

impl Precondition for NotRoot {
    fn description(&self) -> String {
        "not running as root".to_string()
    }

    fn verify(&self, _ctx: &StepContext) -> Result<()> {
        if is_root() {
            bail!("refusing to run as root; run dotstrap as your regular user");
        }
        Ok(())
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

/// The dotfiles tree has been cloned
#[derive(Debug)]
pub struct DotfilesPresent;

impl Precondition for DotfilesPresent {
    fn description(&self) -> String {
        "dotfiles directory exists".to_string()
    }

    fn verify(&self, ctx: &StepContext) -> Result<()> {
        if !ctx.root.is_dir() {
            bail!(
                "dotfiles directory {} does not exist; clone your dotfiles there first",
                ctx.root.display()
            );
        }
        Ok(())
    }
}

/// A program the plan cannot start without is on PATH
#[derive(Debug)]
pub struct CommandAvailable {
    pub program: String,
}

impl Precondition for CommandAvailable {
    fn description(&self) -> String {
        format!("{} is installed", self.program)
    }

    fn verify(&self, _ctx: &StepContext) -> Result<()> {
        if !process::command_exists(&self.program) {
            bail!("{} is not on PATH", self.program);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dotfiles_present() {
        let tmp = TempDir::new().unwrap();
        let ctx = StepContext::new(tmp.path(), tmp.path());
        assert!(DotfilesPresent.verify(&ctx).is_ok());

        let ctx = StepContext::new(tmp.path(), tmp.path().join(".dotfiles"));
        let err = DotfilesPresent.verify(&ctx).unwrap_err();
        assert!(err.to_string().contains("clone your dotfiles"));
    }

    #[test]
    fn test_command_available() {
        let ctx = StepContext::new("/", "/");
        let sh = CommandAvailable {
            program: "sh".to_string(),
        };
        assert!(sh.verify(&ctx).is_ok());

        let missing = CommandAvailable {
            program: "dotstrap-no-such-program".to_string(),
        };
        assert!(missing.verify(&ctx).is_err());
    }

    #[test]
    fn test_not_root_matches_euid() {
        let ctx = StepContext::new("/", "/");
        assert_eq!(NotRoot.verify(&ctx).is_ok(), !is_root());
    }
}
