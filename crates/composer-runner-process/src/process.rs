use crate::error::RunnerError;
use crate::outcome::ExecutionOutcome;
use crate::sink::OutputSink;
use std::time::Duration;

use super::CommandSpec;

// ============================================================================
// ProcessRunner Trait - Secure Process Execution Interface
// ============================================================================

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only (no shell string evaluation)
/// and spawn exactly one child per call.
///
/// # Threading
///
/// `ProcessRunner` is a synchronous interface: `run` blocks the caller until the
/// child exits or the timeout elapses. Implementations may use helper threads
/// internally, but the sink is always invoked on the calling thread, so it does
/// not need to be `Send`.
///
/// # Example
///
/// ```rust
/// use composer_runner_process::{
///     CommandSpec, ExecutionOutcome, OutputSink, ProcessRunner, RunnerError, StreamKind,
/// };
/// use std::time::Duration;
///
/// struct EchoRunner;
///
/// impl ProcessRunner for EchoRunner {
///     fn run(
///         &self,
///         cmd: &CommandSpec,
///         timeout: Duration,
///         mut sink: Option<&mut dyn OutputSink>,
///     ) -> Result<ExecutionOutcome, RunnerError> {
///         if let Some(sink) = sink.as_mut() {
///             sink.on_output(StreamKind::Stdout, cmd.to_command_line().as_bytes());
///         }
///         Ok(ExecutionOutcome::exited(Some(0), Duration::ZERO, timeout))
///     }
/// }
///
/// let mut lines = Vec::new();
/// let mut sink = |_: StreamKind, chunk: &[u8]| lines.push(chunk.to_vec());
/// let outcome = EchoRunner
///     .run(&CommandSpec::new("php").arg("-v"), Duration::from_secs(5), Some(&mut sink))
///     .unwrap();
/// assert!(outcome.success());
/// drop(sink);
/// assert_eq!(lines, vec![b"php -v".to_vec()]);
/// ```
pub trait ProcessRunner {
    /// Execute a command with the given timeout, forwarding output to `sink`.
    ///
    /// # Returns
    ///
    /// * `Ok(ExecutionOutcome)` - The process finished or was killed on timeout;
    ///   inspect [`ExecutionOutcome::status`]
    /// * `Err(RunnerError::*)` - The process could not be spawned or waited on
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Duration,
        sink: Option<&mut dyn OutputSink>,
    ) -> Result<ExecutionOutcome, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use crate::sink::StreamKind;

    /// A mock implementation of ProcessRunner for testing
    struct MockRunner {
        chunks: Vec<(StreamKind, &'static [u8])>,
        exit_code: Option<i32>,
    }

    impl ProcessRunner for MockRunner {
        fn run(
            &self,
            _cmd: &CommandSpec,
            timeout: Duration,
            mut sink: Option<&mut dyn OutputSink>,
        ) -> Result<ExecutionOutcome, RunnerError> {
            if let Some(sink) = sink.as_mut() {
                for (stream, chunk) in &self.chunks {
                    sink.on_output(*stream, chunk);
                }
            }
            Ok(ExecutionOutcome::exited(self.exit_code, Duration::ZERO, timeout))
        }
    }

    #[test]
    fn test_process_runner_forwards_to_sink() {
        let mock = MockRunner {
            chunks: vec![(StreamKind::Stdout, b"out"), (StreamKind::Stderr, b"err")],
            exit_code: Some(1),
        };

        let mut received = Vec::new();
        let mut sink = |stream: StreamKind, chunk: &[u8]| received.push((stream, chunk.to_vec()));
        let outcome = mock
            .run(&CommandSpec::new("test"), Duration::from_secs(30), Some(&mut sink))
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::NonZeroExit);
        assert_eq!(received.len(), 2);
        assert_eq!(received[1], (StreamKind::Stderr, b"err".to_vec()));
    }

    #[test]
    fn test_process_runner_without_sink_discards() {
        let mock = MockRunner {
            chunks: vec![(StreamKind::Stdout, b"ignored")],
            exit_code: Some(0),
        };
        let outcome = mock
            .run(&CommandSpec::new("test"), Duration::from_secs(30), None)
            .unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn test_process_runner_with_error() {
        struct ErrorRunner;

        impl ProcessRunner for ErrorRunner {
            fn run(
                &self,
                cmd: &CommandSpec,
                _timeout: Duration,
                _sink: Option<&mut dyn OutputSink>,
            ) -> Result<ExecutionOutcome, RunnerError> {
                Err(RunnerError::SpawnFailed {
                    program: cmd.program.to_string_lossy().into_owned(),
                    reason: "mock error".to_string(),
                })
            }
        }

        let result = ErrorRunner.run(&CommandSpec::new("php"), Duration::from_secs(30), None);
        match result {
            Err(RunnerError::SpawnFailed { program, reason }) => {
                assert_eq!(program, "php");
                assert_eq!(reason, "mock error");
            }
            other => panic!("Expected SpawnFailed error, got {other:?}"),
        }
    }
}
