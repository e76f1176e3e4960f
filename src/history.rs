//! The last run's report, kept as JSON under the state directory
//!
//! `dotstrap last` reads it back so the outcome of a long bootstrap survives
//! a scrolled-away terminal.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use stepwise::RunReport;

/// Save a report, replacing the previous one
pub fn save(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
    }

    let content =
        serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write run report: {}", path.display()))?;

    log::debug!("Saved run report to {}", path.display());
    Ok(())
}

/// Load the saved report, or `None` if no run was recorded yet
pub fn load(path: &Path) -> Result<Option<RunReport>> {
    if !path.exists() {
        log::debug!("No run report at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read run report: {}", path.display()))?;
    let report = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse run report: {}", path.display()))?;
    Ok(Some(report))
}
