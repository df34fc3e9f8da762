//! Command line editor for hexcells level files.

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod logging;

use crate::cli::{Cli, Command};
use crate::logging::{LogConfig, init_logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
    };
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::New(args) => commands::run_new(&args),
        Command::Check { file } => commands::run_check(&file),
        Command::Show(args) => commands::run_show(&args),
        Command::Resize(args) => commands::run_resize(&args),
        Command::ToggleMine(args) => commands::run_toggle_mine(&args),
        Command::AddRule(args) => commands::run_add_rule(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
