//! Command-line interface for composer-runner
//!
//! - `args`: clap definitions
//! - `run`: entry point, config discovery and error reporting
//! - `commands`: subcommand handlers

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
