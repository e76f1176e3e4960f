//! Status-line helpers shared by every command

use colored::Colorize;
use stepwise::StepResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

/// One status line for a finished step
pub fn status_line(name: &str, result: &StepResult) -> String {
    match result {
        StepResult::Satisfied { detail } => match detail {
            Some(detail) => format!("    {} {} {} ({detail})", "✓".green(), name, "ok".dimmed()),
            None => format!("    {} {} {}", "✓".green(), name, "ok".dimmed()),
        },
        StepResult::Applied => format!("    {} {} applied", "✓".green().bold(), name),
        StepResult::Skipped { reason } => {
            format!("    {} {} skipped: {}", "⊘".yellow(), name, reason)
        }
        StepResult::Failed { error, .. } => {
            format!("    {} {} failed: {}", "✗".red().bold(), name, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        colored::control::set_override(false);
        assert_eq!(
            status_line(
                "symlink-zsh-config",
                &StepResult::Satisfied {
                    detail: Some("points at ~/.dotfiles/zsh/.zshrc".into())
                }
            ),
            "    ✓ symlink-zsh-config ok (points at ~/.dotfiles/zsh/.zshrc)"
        );
        assert_eq!(
            status_line("install-packages", &StepResult::Applied),
            "    ✓ install-packages applied"
        );
        assert_eq!(
            status_line("change-shell", &StepResult::declined()),
            "    ⊘ change-shell skipped: declined by user"
        );
    }
}
