//! External process helpers
//!
//! Commands are given as argv slices (`["pacman", "-Q", "zsh"]`) so that
//! configured commands never pass through a shell unless they ask for one.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

fn command(argv: &[String], cwd: Option<&Path>) -> Result<Command> {
    let (program, args) = argv.split_first().context("Empty command")?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    Ok(cmd)
}

fn display(argv: &[String]) -> String {
    argv.join(" ")
}

/// Run a command with inherited stdio (shows output and prompts in real-time)
pub fn run(argv: &[String], cwd: Option<&Path>) -> Result<ExitStatus> {
    log::debug!("Running: {}", display(argv));
    command(argv, cwd)?
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {}", display(argv)))
}

/// Run a command with inherited stdio and fail on a non-zero exit
pub fn run_checked(argv: &[String], cwd: Option<&Path>) -> Result<()> {
    let status = run(argv, cwd)?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", display(argv), status);
    }
    Ok(())
}

/// Run a command and capture its output, whatever the exit status
pub fn output(argv: &[String], cwd: Option<&Path>) -> Result<Output> {
    log::debug!("Running: {}", display(argv));
    command(argv, cwd)?
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {}", display(argv)))
}

/// Run a command and capture trimmed stdout, failing with its stderr
pub fn run_capture(argv: &[String], cwd: Option<&Path>) -> Result<String> {
    let out = output(argv, cwd)?;
    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    } else {
        anyhow::bail!("{} failed: {}", display(argv), stderr_tail(&out))
    }
}

/// Run a command silently, returning whether it exited 0
///
/// Unlike a non-zero exit, failing to spawn is an error: a missing
/// query tool must not read as "not installed".
pub fn succeeds(argv: &[String], cwd: Option<&Path>) -> Result<bool> {
    log::trace!("Checking: {}", display(argv));
    let status = command(argv, cwd)?
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("Failed to execute: {}", display(argv)))?;
    Ok(status.success())
}

/// Run `script` through `sh -c`
pub fn shell(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Check if a command exists on PATH
pub fn command_exists(cmd: &str) -> bool {
    which(cmd).is_some()
}

/// Resolve a command name to its absolute path
pub fn which(cmd: &str) -> Option<String> {
    let argv = ["which".to_string(), cmd.to_string()];
    output(&argv, None)
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|path| !path.is_empty())
}

/// Last few lines of stderr, for error messages
pub fn stderr_tail(out: &Output) -> String {
    let stderr = String::from_utf8_lossy(&out.stderr);
    let lines: Vec<_> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(5);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        format!("exited with {}", out.status)
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        shell(script)
    }

    #[test]
    fn test_empty_command_is_error() {
        assert!(output(&[], None).is_err());
    }

    #[test]
    fn test_succeeds() {
        assert!(succeeds(&sh("exit 0"), None).unwrap());
        assert!(!succeeds(&sh("exit 3"), None).unwrap());
    }

    #[test]
    fn test_missing_program_is_error_not_false() {
        let argv = ["dotstrap-no-such-program-xyz".to_string()];
        assert!(succeeds(&argv, None).is_err());
    }

    #[test]
    fn test_run_capture() {
        assert_eq!(run_capture(&sh("echo ' hi '"), None).unwrap(), "hi");
        let err = run_capture(&sh("echo nope >&2; exit 1"), None).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_cwd() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("marker"), "").unwrap();
        assert!(succeeds(&sh("test -e marker"), Some(tmp.path())).unwrap());
    }

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("dotstrap-no-such-program-xyz"));
    }
}
