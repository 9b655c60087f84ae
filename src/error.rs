//! Error types surfaced by [`ComposerRunner`](crate::ComposerRunner)

use composer_runner_config::ConfigError;
use composer_runner_locate::LocateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerRunnerError {
    /// No usable PHP interpreter; never retried
    #[error(transparent)]
    InterpreterNotFound(#[from] LocateError),

    /// Neither the host nor a fresh installation provided a binary
    #[error("Cannot find composer: {reason}")]
    BinaryNotFound { reason: String },

    #[error("An error occurred when executing the \"{command}\" command: {reason}")]
    CommandFailed {
        /// The full command line, shell-quoted
        command: String,
        exit_code: Option<i32>,
        timed_out: bool,
        reason: String,
    },

    #[error("Invalid composer command {command:?}: {reason}")]
    InvalidCommand { command: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
