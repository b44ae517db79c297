mod cli;
mod commands;
mod config;
mod provider;
mod transport;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
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
    };
    let state_override = cli.state_file.as_deref();

    match cli.command {
        Command::Status(args) => commands::infra::status(&ctx, &args, state_override),
        Command::Plan(args) => commands::infra::plan(&ctx, &args, state_override),
        Command::Apply(args) => commands::infra::apply(&ctx, &args, state_override),
        Command::Run(args) => commands::run::run(&ctx, &args, state_override),
        Command::Up(args) => commands::up::up(&ctx, &args, state_override),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
