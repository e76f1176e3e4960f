use colored::Colorize;
use stepwise::{CheckOutcome, RunReport, RunStatus, RunSummary, Survey, SurveySummary};

use crate::ui;

/// Print the end-of-run summary
pub fn print_report(report: &RunReport) {
    println!();
    match report.status() {
        RunStatus::Converged if report.dry_run => {
            println!("  {} Dry run finished, nothing was changed", "✓".green().bold());
        }
        RunStatus::Converged => println!("  {} Machine is bootstrapped", "✓".green().bold()),
        RunStatus::CompletedWithFailures => {
            println!("  {} Finished with failures", "⚠".yellow().bold());
        }
        RunStatus::Aborted => println!("  {} Run aborted", "✗".red().bold()),
    }

    for line in count_lines(&report.summary()) {
        println!("    • {line}");
    }

    let backups: Vec<_> = report.backups().collect();
    if !backups.is_empty() {
        println!();
        println!("  {}", "Backed up before overwriting:".bold());
        for b in backups {
            println!(
                "    {} → {}",
                b.original.display(),
                b.backup.display().to_string().dimmed()
            );
        }
    }

    if let Some(guidance) = report.guidance() {
        println!();
        ui::warn(&guidance);
    }
}

fn count_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.applied > 0 {
        lines.push(format!("{} applied", summary.applied));
    }
    if summary.satisfied > 0 {
        lines.push(format!("{} already done", summary.satisfied));
    }
    if summary.skipped > 0 {
        lines.push(format!("{} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        lines.push(format!("{} {}", summary.failed, "failed".red()));
    }
    lines
}

/// Print a status table from surveys
pub fn print_surveys(surveys: &[Survey]) {
    ui::header("Step status");
    let width = surveys.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for survey in surveys {
        println!("  {}", survey_line(survey, width));
    }

    let summary = SurveySummary::from_surveys(surveys);
    println!();
    if summary.has_work() {
        ui::info(&format!(
            "{} pending, {} errors, {} done; run `dotstrap apply` to converge",
            summary.pending, summary.errors, summary.satisfied
        ));
    } else {
        ui::success(&format!("All {} steps satisfied", summary.satisfied));
    }
}

fn survey_line(survey: &Survey, width: usize) -> String {
    let (mark, detail) = match &survey.outcome {
        Ok(CheckOutcome::Satisfied { detail }) => ("✓".green(), detail.clone()),
        Ok(CheckOutcome::Pending { detail }) => ("○".yellow(), detail.clone()),
        Err(e) => ("✗".red(), Some(e.clone())),
    };
    let detail = detail.unwrap_or_else(|| survey.description.clone());
    format!("{mark} {:<width$}  {}", survey.name, detail.dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(name: &str, outcome: Result<CheckOutcome, String>) -> Survey {
        Survey {
            name: name.to_string(),
            kind: "step".to_string(),
            description: format!("Do {name}"),
            requires_confirmation: true,
            outcome,
        }
    }

    #[test]
    fn test_count_lines_skip_zero() {
        colored::control::set_override(false);
        let summary = RunSummary {
            satisfied: 3,
            applied: 1,
            skipped: 0,
            failed: 0,
        };
        assert_eq!(count_lines(&summary), ["1 applied", "3 already done"]);
    }

    #[test]
    fn test_survey_line() {
        colored::control::set_override(false);
        let p = survey("stow-tmux", Ok(CheckOutcome::pending_because("2 changes")));
        assert_eq!(survey_line(&p, 12), "○ stow-tmux     2 changes");

        let p = survey("change-shell", Ok(CheckOutcome::satisfied()));
        assert_eq!(survey_line(&p, 12), "✓ change-shell  Do change-shell");

        let p = survey("x", Err("boom".into()));
        assert_eq!(survey_line(&p, 1), "✗ x  boom");
    }
}
