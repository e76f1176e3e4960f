//! Login shell step

use anyhow::{Context, Result, bail};
use std::path::Path;
use stepwise::{CheckOutcome, OnFailure, Step, StepContext};

use crate::process;

/// Make `shell` the user's login shell with `chsh`
#[derive(Debug, Clone)]
pub struct LoginShell {
    name: String,
    /// Name looked up on PATH, or an absolute path
    shell: String,
    user: String,
}

impl LoginShell {
    pub fn new(name: impl Into<String>, shell: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shell: shell.into(),
            user: user.into(),
        }
    }

    fn resolve(&self) -> Option<String> {
        if Path::new(&self.shell).is_absolute() {
            Path::new(&self.shell)
                .exists()
                .then(|| self.shell.clone())
        } else {
            process::which(&self.shell)
        }
    }

    fn current(&self) -> Result<String> {
        let argv = ["getent", "passwd", self.user.as_str()].map(String::from);
        let entry = process::run_capture(&argv, None)
            .with_context(|| format!("Failed to look up user {}", self.user))?;
        login_shell_of(&entry)
            .map(str::to_string)
            .with_context(|| format!("Malformed passwd entry for {}", self.user))
    }
}

/// The login shell field of a passwd(5) line
pub fn login_shell_of(entry: &str) -> Option<&str> {
    let line = entry.lines().next()?;
    let fields: Vec<_> = line.split(':').collect();
    (fields.len() == 7).then(|| fields[6].trim())
}

impl Step for LoginShell {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("Change the login shell of {} to {}", self.user, self.shell)
    }

    fn kind(&self) -> &'static str {
        "shell"
    }

    fn check(&self, _ctx: &StepContext) -> Result<CheckOutcome> {
        let Some(path) = self.resolve() else {
            return Ok(CheckOutcome::pending_because(format!(
                "{} is not installed yet",
                self.shell
            )));
        };

        let current = self.current()?;
        if current == path {
            Ok(CheckOutcome::satisfied_because(path))
        } else {
            Ok(CheckOutcome::pending_because(format!(
                "login shell is {current}"
            )))
        }
    }

    fn apply(&self, _ctx: &mut StepContext) -> Result<()> {
        let Some(path) = self.resolve() else {
            bail!("{} not found", self.shell);
        };
        // chsh asks for the password itself
        let argv = ["chsh", "-s", path.as_str()].map(String::from);
        process::run_checked(&argv, None)
    }

    fn on_failure(&self) -> OnFailure {
        OnFailure::SkipAndContinue
    }

    fn remediation(&self) -> Option<String> {
        Some(format!(
            "run `chsh -s $(which {})` yourself; the shell must be listed in /etc/shells",
            self.shell
        ))
    }

    fn uses_terminal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_shell_of() {
        assert_eq!(
            login_shell_of("me:x:1000:1000:Me,,,:/home/me:/usr/bin/zsh\n"),
            Some("/usr/bin/zsh")
        );
        assert_eq!(login_shell_of("broken:entry"), None);
        assert_eq!(login_shell_of(""), None);
    }

    #[test]
    fn test_missing_shell_is_pending() {
        let step = LoginShell::new("change-shell", "/nonexistent/bin/zsh", "nobody");
        let outcome = step.check(&StepContext::new("/h", "/h")).unwrap();
        assert!(!outcome.is_satisfied());
        assert_eq!(
            outcome.detail(),
            Some("/nonexistent/bin/zsh is not installed yet")
        );
    }

    #[test]
    fn test_missing_shell_apply_fails() {
        let step = LoginShell::new("change-shell", "dotstrap-no-such-shell", "nobody");
        let err = step.apply(&mut StepContext::new("/h", "/h")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_policy() {
        let step = LoginShell::new("change-shell", "zsh", "me");
        assert_eq!(step.on_failure(), OnFailure::SkipAndContinue);
        assert!(step.requires_confirmation());
        assert!(step.uses_terminal());
    }
}
