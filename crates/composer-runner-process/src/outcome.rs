use std::fmt;
use std::time::Duration;

/// Classification of a finished (or abandoned) process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Exited with code 0 within the timeout
    Success,
    /// Exited with a non-zero code, or was terminated by a signal
    NonZeroExit,
    /// Still running when the timeout elapsed; the process was killed
    TimedOut,
}

impl OutcomeStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NonZeroExit => "nonzero_exit",
            Self::TimedOut => "timeout",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a process to completion or timeout.
///
/// Output is never part of the outcome; it only ever flows to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code (None if terminated by signal or killed on timeout)
    pub exit_code: Option<i32>,
    pub status: OutcomeStatus,
    /// Wall-clock time from spawn to outcome
    pub elapsed: Duration,
    /// Timeout the process ran under
    pub timeout: Duration,
}

impl ExecutionOutcome {
    /// Outcome of a process that exited on its own.
    #[must_use]
    pub fn exited(exit_code: Option<i32>, elapsed: Duration, timeout: Duration) -> Self {
        let status = if exit_code == Some(0) {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::NonZeroExit
        };
        Self {
            exit_code,
            status,
            elapsed,
            timeout,
        }
    }

    /// Outcome of a process that was killed because it exceeded `timeout`.
    #[must_use]
    pub fn timed_out(elapsed: Duration, timeout: Duration) -> Self {
        Self {
            exit_code: None,
            status: OutcomeStatus::TimedOut,
            elapsed,
            timeout,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Short human-readable reason for a failed outcome.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.status, self.exit_code) {
            (OutcomeStatus::Success, _) => "exited successfully".to_string(),
            (OutcomeStatus::NonZeroExit, Some(code)) => format!("exited with code {code}"),
            (OutcomeStatus::NonZeroExit, None) => "terminated by signal".to_string(),
            (OutcomeStatus::TimedOut, _) => format!(
                "timed out after {} seconds",
                self.timeout.as_secs_f64()
            ),
        }
    }
}
