//! composer-runner - locate or bootstrap Composer and drive it safely
//!
//! Resolves a `composer` executable on the host, falls back to downloading and
//! running the official installer into a temporary directory when none exists,
//! and executes Composer commands with live output streaming, a hard timeout and
//! guaranteed removal of anything it installed.
//!
//! composer-runner can be used in two ways:
//! - **CLI**: `composer-runner run install --prefer-dist`
//! - **Library**: build a [`ComposerRunner`] and call [`ComposerRunner::execute`]
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use composer_runner::{ComposerRunner, StreamKind};
//! use std::time::Duration;
//!
//! let mut runner = ComposerRunner::builder().working_dir("/srv/app").build();
//! let mut sink = |stream: StreamKind, chunk: &[u8]| match stream {
//!     StreamKind::Stdout => print!("{}", String::from_utf8_lossy(chunk)),
//!     StreamKind::Stderr => eprint!("{}", String::from_utf8_lossy(chunk)),
//! };
//! runner.execute("install", &["--no-dev"], Some(&mut sink), runner.default_timeout())?;
//! // The temporary installation (if any) is removed when `runner` is dropped
//! # Ok::<(), composer_runner::ComposerRunnerError>(())
//! ```
//!
//! # Resolution
//!
//! 1. `composer` / `composer.phar` on `PATH`, then in the working directory and
//!    its ancestors
//! 2. a live temporary installation created earlier by the same runner
//! 3. a fresh download of <https://getcomposer.org/installer>, run with PHP in a
//!    new temporary directory
//!
//! # Configuration
//!
//! [`Config`] merges CLI flags, `COMPOSER_RUNNER_*` environment variables and an
//! upward-discovered `.composer-runner.toml`; see [`ComposerRunner::from_config`].

pub mod cli;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod runner;

pub use composer_runner_config::{CliArgs, Config, ConfigError, ConfigSource};
pub use composer_runner_install::{HttpInstallerSource, InstallError, InstallerSource, TempInstallation};
pub use composer_runner_locate::{BinaryLocator, Interpreter, LocateError, RuntimeLocator};
pub use composer_runner_process::{
    CommandSpec, ExecutionOutcome, NativeRunner, OutcomeStatus, OutputSink, ProcessRunner,
    RunnerError, StreamKind,
};
pub use error::ComposerRunnerError;
pub use exit_codes::ExitCode;
pub use runner::{BinaryOrigin, ComposerRunner, ComposerRunnerBuilder, ResolvedBinary};
