use anyhow::{Context as _, Result};
use colored::Colorize;

use super::load_config;
use crate::Context;
use crate::ui;

/// List backup directories, oldest first
///
/// Backups are never pruned automatically; remove old ones by hand.
pub fn run(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let root = config.backup_dir()?;
    let sets = stepwise::backup::list(&root)
        .with_context(|| format!("Failed to read backups in {}", root.display()))?;

    if sets.is_empty() {
        ui::info(&format!("No backups in {}", root.display()));
        return Ok(());
    }

    ui::header("Backups");
    for set in &sets {
        let files = if set.files == 1 { "file" } else { "files" };
        println!(
            "  {}  {:>3} {}  {}",
            set.stamp.bold(),
            set.files,
            files,
            set.path.display().to_string().dimmed()
        );
    }
    Ok(())
}
