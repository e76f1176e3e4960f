//! Step context and provider traits
//!
//! These traits let the runner be driven without depending on a specific
//! terminal library: the binary plugs in dialoguer and indicatif, tests plug
//! in scripted answers.

use anyhow::Result;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::step::Step;
use crate::types::{RunReport, StepResult};

/// Capability to ask the operator a yes/no question
pub trait Confirmer {
    /// Ask the operator to confirm an action
    ///
    /// # Returns
    /// `true` only on an explicit yes; anything else is `false`
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Progress callback for provisioning runs
pub trait ProgressCallback {
    /// Called once before the first step
    fn on_run_start(&mut self, total: usize);

    /// Called when a step begins (before its check)
    fn on_step_start(&mut self, index: usize, total: usize, step: &dyn Step);

    /// Called right before a step's apply
    fn on_apply_start(&mut self, _step: &dyn Step) {}

    /// Called when a step reaches a terminal state
    fn on_step_complete(&mut self, name: &str, result: &StepResult);

    /// Called once with the final report
    fn on_run_complete(&mut self, _report: &RunReport) {}
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_run_start(&mut self, _total: usize) {}
    fn on_step_start(&mut self, _index: usize, _total: usize, _step: &dyn Step) {}
    fn on_step_complete(&mut self, _name: &str, _result: &StepResult) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl Confirmer for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Replays a fixed sequence of answers; answers "no" once exhausted
#[derive(Debug, Default)]
pub struct Scripted {
    answers: VecDeque<bool>,
    prompts: Vec<String>,
}

impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts seen so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirmer for Scripted {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

/// Plain line-based prompt over any reader/writer pair
///
/// Only `y` or `yes` (any case) confirm. Empty input and end of input
/// count as no.
pub struct LineConfirmer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirmer for LineConfirmer<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        write!(self.output, "{prompt} [y/N] ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&line))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Context passed to step checks and applies
///
/// Everything a step needs from its environment lives here so steps
/// never read the working directory or process-wide state.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Home directory links and backups are relative to
    pub home: PathBuf,
    /// Directory relative step paths resolve against (the dotfiles tree)
    pub root: PathBuf,
}

impl StepContext {
    pub fn new(home: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            root: root.into(),
        }
    }

    /// Resolve a path against the root unless it is already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Resolve a path against the home directory unless it is already absolute
    pub fn in_home(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> bool {
        let mut out = Vec::new();
        let mut confirmer = LineConfirmer::new(Cursor::new(input.as_bytes()), &mut out);
        confirmer.confirm("Install packages?").unwrap()
    }

    #[test]
    fn test_line_confirmer_accepts_yes() {
        assert!(ask("y\n"));
        assert!(ask("YES\n"));
        assert!(ask("  yes  \n"));
    }

    #[test]
    fn test_line_confirmer_defaults_to_no() {
        assert!(!ask("\n"));
        assert!(!ask(""));
        assert!(!ask("n\n"));
        assert!(!ask("sure\n"));
    }

    #[test]
    fn test_line_confirmer_writes_prompt() {
        let mut out = Vec::new();
        let mut confirmer = LineConfirmer::new(Cursor::new(b"n\n".as_slice()), &mut out);
        confirmer.confirm("Change shell?").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Change shell? [y/N] ");
    }

    #[test]
    fn test_scripted_replays_then_declines() {
        let mut scripted = Scripted::new([true, false]);
        assert!(scripted.confirm("one").unwrap());
        assert!(!scripted.confirm("two").unwrap());
        assert!(!scripted.confirm("three").unwrap());
        assert_eq!(scripted.prompts(), ["one", "two", "three"]);
    }

    #[test]
    fn test_resolve_paths() {
        let ctx = StepContext::new("/home/u", "/home/u/.dotfiles");
        assert_eq!(
            ctx.resolve(Path::new("zsh/.zshrc")),
            PathBuf::from("/home/u/.dotfiles/zsh/.zshrc")
        );
        assert_eq!(ctx.resolve(Path::new("/etc/x")), PathBuf::from("/etc/x"));
        assert_eq!(
            ctx.in_home(Path::new(".zshrc")),
            PathBuf::from("/home/u/.zshrc")
        );
    }
}
