//! Error types for process execution

use thiserror::Error;

/// Failures that prevent a process from being run to an outcome.
///
/// Non-zero exits and timeouts are not errors; they are reported through
/// [`ExecutionOutcome`](crate::ExecutionOutcome).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn process '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Failed to wait for process '{program}': {reason}")]
    WaitFailed { program: String, reason: String },
}
