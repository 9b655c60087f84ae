//! Configuration management for composer-runner
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. The TOML file has `[runner]`, `[php]`
//! and `[installer]` sections; every effective value remembers where it came from.

mod cli_args;
mod discovery;
mod error;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use discovery::{CONFIG_FILE_NAME, ENV_INSTALLER_SHA384, ENV_INSTALLER_URL, ENV_PHP, ENV_TIMEOUT};
pub use error::ConfigError;
pub use model::{Config, ConfigSource, InstallerSettings, PhpSettings, RunnerSettings};
