//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// composer-runner - run Composer commands, installing Composer on demand
#[derive(Debug, Parser)]
#[command(name = "composer-runner")]
#[command(about = "Run Composer commands, bootstrapping a temporary Composer when none is installed")]
#[command(long_about = r#"
composer-runner finds `composer` on PATH or in the working directory and its
parents. When none exists it downloads the official installer, runs it with PHP
into a temporary directory, and removes that directory when it is done.

EXAMPLES:
  # Install dependencies with a two minute limit
  composer-runner run --timeout 120 install -- --no-dev --prefer-dist

  # A multi-word command is split like a shell would
  composer-runner run "require monolog/monolog"

  # Show which composer would be used
  composer-runner find --json

  # Show effective configuration and where each value came from
  composer-runner config

CONFIGURATION:
  Precedence: CLI flags > COMPOSER_RUNNER_* environment > config file > defaults
  The config file is discovered by searching upward from CWD for .composer-runner.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// PHP interpreter used to run Composer
    #[arg(long, global = true, value_name = "PATH")]
    pub php: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a Composer command with --no-interaction
    Run {
        /// Timeout in seconds for the Composer process
        #[arg(long)]
        timeout: Option<u64>,

        /// Composer command, e.g. `install` or "require vendor/pkg"
        command: String,

        /// Extra arguments, each passed through literally
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Resolve the Composer binary without running it
    Find {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Timeout override carried by the selected subcommand
    #[must_use]
    pub fn timeout_secs(&self) -> Option<u64> {
        match &self.command {
            Commands::Run { timeout, .. } => *timeout,
            Commands::Find { .. } | Commands::Config => None,
        }
    }
}
