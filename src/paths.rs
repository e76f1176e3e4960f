//! Path resolution for dotstrap
//!
//! # Environment Variables
//!
//! - `DOTSTRAP_CONFIG_DIR` - Override the config directory
//! - `DOTSTRAP_STATE_DIR` - Override the state directory (backups, last run)
//!
//! # Resolution Priority
//!
//! For config_dir():
//! 1. `DOTSTRAP_CONFIG_DIR`
//! 2. `XDG_CONFIG_HOME/dotstrap`
//! 3. `~/.config/dotstrap`
//!
//! For state_dir():
//! 1. `DOTSTRAP_STATE_DIR`
//! 2. `XDG_STATE_HOME/dotstrap`
//! 3. `~/.local/state/dotstrap`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "DOTSTRAP_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "DOTSTRAP_STATE_DIR";

const APP: &str = "dotstrap";

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine home directory")
}

/// Get the dotstrap config directory
pub fn config_dir() -> Result<PathBuf> {
    resolve(ENV_CONFIG_DIR, "XDG_CONFIG_HOME", &[".config"])
}

/// Get the dotstrap state directory
pub fn state_dir() -> Result<PathBuf> {
    resolve(ENV_STATE_DIR, "XDG_STATE_HOME", &[".local", "state"])
}

/// Default location of `config.toml`
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Where each run's timestamped backup directory goes
pub fn backups_dir() -> Result<PathBuf> {
    Ok(state_dir()?.join("backups"))
}

/// Report of the most recent apply
pub fn last_run_file() -> Result<PathBuf> {
    Ok(state_dir()?.join("last-run.json"))
}

fn resolve(override_var: &str, xdg_var: &str, fallback: &[&str]) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(override_var) {
        let path = expand(&dir);
        log::debug!("Using {} from {}: {}", APP, override_var, path.display());
        return Ok(path);
    }

    if let Ok(xdg) = std::env::var(xdg_var)
        && !xdg.is_empty()
    {
        let path = PathBuf::from(xdg).join(APP);
        log::debug!("Using {}: {}", xdg_var, path.display());
        return Ok(path);
    }

    let mut path = home_dir()?;
    path.extend(fallback);
    path.push(APP);
    log::debug!("Using default dir: {}", path.display());
    Ok(path)
}

/// Expand `~` and environment variables in a path string
///
/// Strings that fail to expand (unknown variables) are returned unchanged.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
