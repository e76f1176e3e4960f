mod cli;
mod commands;
mod config;
mod engine;
mod history;
mod paths;
mod plan;
mod process;
mod steps;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Explicit config file from `--config`/`DOTSTRAP_CONFIG`
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Status { jobs } => commands::status::run(&ctx, jobs),
        Command::List => commands::list::run(&ctx),
        Command::Backups => commands::backups::run(&ctx),
        Command::Last { json } => commands::last::run(&ctx, json),
        Command::InitConfig { force } => commands::init_config::run(&ctx, force),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "dotstrap", &mut io::stdout());
            Ok(())
        }
    }
}
