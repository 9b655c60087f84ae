//! CLI entry point and dispatch
//!
//! `run()` owns all user-facing output, including errors. main.rs only turns
//! the returned [`ExitCode`] into a process exit status.

use clap::Parser;
use clap::error::ErrorKind;

use super::args::{Cli, Commands};
use super::commands;

use crate::logging::init_tracing;
use crate::{CliArgs, ComposerRunnerError, Config, ExitCode};

/// Parse arguments, load configuration and dispatch the selected subcommand.
pub fn run() -> Result<(), ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let informational =
                matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            // clap decides between stdout and stderr itself
            let _ = err.print();
            return if informational {
                Ok(())
            } else {
                Err(ExitCode::CLI_ARGS)
            };
        }
    };

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        php_binary: cli.php.clone(),
        timeout_secs: cli.timeout_secs(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = ComposerRunnerError::from(err);
            eprintln!("✗ {err}");
            return Err(err.to_exit_code());
        }
    };

    let result = match cli.command {
        Commands::Run { command, args, .. } => {
            commands::execute_run_command(&config, &command, &args)
        }
        Commands::Find { json } => commands::execute_find_command(&config, json),
        Commands::Config => commands::execute_config_command(&config),
    };

    if let Err(error) = result {
        if let Some(runner_error) = error.downcast_ref::<ComposerRunnerError>() {
            eprintln!("✗ {runner_error}");
            return Err(runner_error.to_exit_code());
        }
        eprintln!("✗ Unexpected error: {error:#}");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}
