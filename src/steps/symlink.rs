//! Native symlink step for single files

use anyhow::{Context, Result, bail};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stepwise::{CheckOutcome, Step, StepContext};

use super::{display_home, tilde};

/// Link `target` (under home) to `source` (under the dotfiles dir)
///
/// Whatever sits at `target` is declared as overwritten, so the runner
/// backs up a real file or directory before it is replaced.
#[derive(Debug, Clone)]
pub struct Symlink {
    name: String,
    source: PathBuf,
    target: PathBuf,
}

#[derive(Debug, PartialEq)]
enum SymlinkState {
    Missing,
    Correct,
    WrongTarget(PathBuf),
    Occupied,
}

impl Symlink {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    fn paths(&self, ctx: &StepContext) -> (PathBuf, PathBuf) {
        (ctx.resolve(&self.source), ctx.in_home(&self.target))
    }

    fn state(&self, ctx: &StepContext) -> Result<SymlinkState> {
        let (source, target) = self.paths(ctx);

        let meta = match fs::symlink_metadata(&target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SymlinkState::Missing),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot inspect {}", target.display()));
            }
        };
        if !meta.file_type().is_symlink() {
            return Ok(SymlinkState::Occupied);
        }

        let link = fs::read_link(&target)
            .with_context(|| format!("Failed to read symlink {}", target.display()))?;
        let link = match target.parent() {
            Some(parent) if link.is_relative() => parent.join(&link),
            _ => link,
        };

        // Canonicalize for comparison; a dangling link keeps its raw target
        let expected = source.canonicalize().unwrap_or(source);
        let actual = link.canonicalize().unwrap_or(link);
        if expected == actual {
            Ok(SymlinkState::Correct)
        } else {
            Ok(SymlinkState::WrongTarget(actual))
        }
    }
}

impl Step for Symlink {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("Link {} -> {}", tilde(&self.target), self.source.display())
    }

    fn kind(&self) -> &'static str {
        "symlink"
    }

    fn check(&self, ctx: &StepContext) -> Result<CheckOutcome> {
        Ok(match self.state(ctx)? {
            SymlinkState::Correct => CheckOutcome::satisfied_because(format!(
                "-> {}",
                display_home(&ctx.resolve(&self.source), &ctx.home)
            )),
            SymlinkState::Missing => CheckOutcome::pending(),
            SymlinkState::WrongTarget(actual) => CheckOutcome::pending_because(format!(
                "points to {}",
                display_home(&actual, &ctx.home)
            )),
            SymlinkState::Occupied => {
                CheckOutcome::pending_because("existing file will be backed up and replaced")
            }
        })
    }

    fn apply(&self, ctx: &mut StepContext) -> Result<()> {
        let (source, target) = self.paths(ctx);

        if !source.exists() {
            bail!("Source does not exist: {}", source.display());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        match self.state(ctx)? {
            SymlinkState::Correct => return Ok(()),
            SymlinkState::Missing => {}
            SymlinkState::WrongTarget(_) => fs::remove_file(&target).with_context(|| {
                format!("Failed to remove existing symlink: {}", target.display())
            })?,
            SymlinkState::Occupied => remove_path(&target)?,
        }

        create_link(&source, &target)
    }

    fn overwrites(&self, ctx: &StepContext) -> Vec<PathBuf> {
        vec![ctx.in_home(&self.target)]
    }

    fn remediation(&self) -> Option<String> {
        Some(format!(
            "make sure {} exists in your dotfiles",
            self.source.display()
        ))
    }
}

/// Remove a file or directory tree
pub(crate) fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("Failed to remove {}", path.display()))
}

#[cfg(unix)]
fn create_link(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target).with_context(|| {
        format!(
            "Failed to create symlink: {} -> {}",
            target.display(),
            source.display()
        )
    })
}

#[cfg(not(unix))]
fn create_link(_source: &Path, _target: &Path) -> Result<()> {
    bail!("Symlinks not supported on this platform")
}
