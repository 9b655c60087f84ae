//! Exit code constants and error mapping for composer-runner.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Command completed successfully |
//! | 1 | `INTERNAL` | General failure, or a failed command without an exit code |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 124 | `TIMEOUT` | The Composer command exceeded its timeout |
//! | 127 | `NOT_FOUND` | PHP or Composer could not be found |
//!
//! A Composer command that exits non-zero makes `composer-runner run` exit with
//! the same code.

use crate::error::ComposerRunnerError;

/// Process exit code for the `composer-runner` binary.
///
/// # Example
///
/// ```rust
/// use composer_runner::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(127), ExitCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - command completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Timeout - the command was killed after exceeding its timeout
    pub const TIMEOUT: ExitCode = ExitCode(124);

    /// Not found - no PHP interpreter or Composer binary
    pub const NOT_FOUND: ExitCode = ExitCode(127);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.0
    }
}

impl ComposerRunnerError {
    /// Map this error to the exit code the CLI reports.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::InvalidCommand { .. } => ExitCode::CLI_ARGS,
            Self::InterpreterNotFound(_) | Self::BinaryNotFound { .. } => ExitCode::NOT_FOUND,
            Self::CommandFailed {
                timed_out: true, ..
            } => ExitCode::TIMEOUT,
            Self::CommandFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => ExitCode(*code),
            Self::CommandFailed { .. } => ExitCode::INTERNAL,
        }
    }
}
