use anyhow::{Context as _, Result};

use crate::engine::summary;
use crate::{Context, history, paths, ui};

/// Show the report saved by the most recent apply
pub fn run(_ctx: &Context, json: bool) -> Result<()> {
    let path = paths::last_run_file()?;
    let Some(report) = history::load(&path)? else {
        ui::info("No run recorded yet; run `dotstrap apply` first");
        return Ok(());
    };

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    let started = report
        .started_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");
    ui::header(&format!("Last run ({started})"));
    for record in &report.records {
        println!("{}", ui::status_line(&record.name, &record.result));
    }
    summary::print_report(&report);
    Ok(())
}
