use anyhow::{Context, Result};
use std::io::{self, Stderr, StdinLock};
use stepwise::{Confirmer, LineConfirmer};

/// Asks before each confirmable step
///
/// Uses a dialoguer prompt when stderr is a terminal and falls back to
/// reading plain `y`/`yes` lines from stdin otherwise (piped answers).
/// Either way the default answer is no.
pub enum TerminalConfirmer {
    Dialog,
    Lines(LineConfirmer<StdinLock<'static>, Stderr>),
}

impl TerminalConfirmer {
    pub fn detect() -> Self {
        if console::Term::stderr().is_term() {
            Self::Dialog
        } else {
            Self::Lines(LineConfirmer::new(io::stdin().lock(), io::stderr()))
        }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self {
            Self::Dialog => {
                let answer = dialoguer::Confirm::new()
                    .with_prompt(format!("{prompt}?"))
                    .default(false)
                    .interact_opt()
                    .context("Failed to read confirmation")?;
                Ok(answer.unwrap_or(false))
            }
            Self::Lines(lines) => lines.confirm(prompt),
        }
    }
}
