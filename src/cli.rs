use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dotstrap")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Bootstrap a fresh Linux desktop from your dotfiles", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/dotstrap/config.toml)
    #[arg(short, long, global = true, env = "DOTSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bootstrap plan, asking before each change
    Apply(ApplyArgs),

    /// Check every step without changing anything
    Status {
        /// Checks to run in parallel
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },

    /// List the steps of the plan in order
    List,

    /// List backups taken before files were overwritten
    Backups,

    /// Show the report of the last apply
    Last {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in defaults to the config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Apply every step without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Check and ask, but change nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Only run these steps (comma-separated)
    #[arg(long)]
    pub only: Option<String>,

    /// Skip these steps (comma-separated)
    #[arg(long)]
    pub skip: Option<String>,

    /// Print the run report as JSON instead of status lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from([
            "dotstrap",
            "-vv",
            "apply",
            "--yes",
            "--only",
            "install-packages,change-shell",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert!(args.yes);
        assert!(!args.dry_run);
        assert_eq!(args.only.as_deref(), Some("install-packages,change-shell"));
    }

    #[test]
    fn test_status_default_jobs() {
        let cli = Cli::parse_from(["dotstrap", "status"]);
        assert!(matches!(cli.command, Command::Status { jobs: 4 }));
    }
}
