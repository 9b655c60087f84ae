use crate::error::RunnerError;
use crate::outcome::ExecutionOutcome;
use crate::platform;
use crate::sink::{OutputSink, StreamKind};
use std::io::{ErrorKind, Read};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{CommandSpec, ProcessRunner};

/// Size of a single read from a child pipe
const READ_CHUNK_BYTES: usize = 8192;

/// How long to keep forwarding output already in flight after a timeout kill,
/// or after the child exits while its pipes are still open
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Poll interval while waiting for a child whose pipes are already closed
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Longest wait for output before checking whether the child has exited
const OUTPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

type Chunk = (StreamKind, Vec<u8>);

// ============================================================================
// NativeRunner - Secure Native Process Execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// # Behavior
///
/// - stdin is closed, stdout and stderr are piped
/// - one reader thread per pipe sends chunks over a channel; the calling thread
///   forwards them to the sink in arrival order
/// - on timeout the child (on Unix, its whole process group) is killed and
///   reaped, and output already in flight is drained briefly
/// - a timeout too large to add to the start instant means no deadline
/// - once the child itself has exited, output is drained for a short grace
///   period and the child's own status is reported, even if a background
///   descendant still holds the pipes open; that descendant is left running
///
/// # Example
///
/// ```rust,no_run
/// use composer_runner_process::{CommandSpec, NativeRunner, ProcessRunner, StreamKind};
/// use std::time::Duration;
///
/// let mut sink = |stream: StreamKind, chunk: &[u8]| {
///     eprintln!("[{stream}] {}", String::from_utf8_lossy(chunk));
/// };
/// let outcome = NativeRunner::new()
///     .run(&CommandSpec::new("php").arg("-v"), Duration::from_secs(30), Some(&mut sink))
///     .unwrap();
/// assert!(outcome.success());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for NativeRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        timeout: Duration,
        mut sink: Option<&mut dyn OutputSink>,
    ) -> Result<ExecutionOutcome, RunnerError> {
        let program = cmd.program.to_string_lossy().into_owned();

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        platform::isolate_process_group(&mut command);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;
        debug!(pid = child.id(), program = %program, "Spawned process");

        let (tx, rx) = mpsc::channel::<Chunk>();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, StreamKind::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, StreamKind::Stderr, tx.clone());
        }
        drop(tx);

        // A timeout too large to represent as an instant means no deadline
        let deadline = started.checked_add(timeout);
        let wait_failed = |e: std::io::Error| RunnerError::WaitFailed {
            program: program.clone(),
            reason: e.to_string(),
        };

        let mut pipes_open = true;
        let mut exited: Option<(ExitStatus, Instant)> = None;
        let status = loop {
            if !pipes_open {
                break wait_until(&mut child, deadline).map_err(wait_failed)?;
            }
            if exited.is_none()
                && let Some(status) = child.try_wait().map_err(wait_failed)?
            {
                exited = Some((status, Instant::now()));
            }
            if let Some((status, at)) = exited
                && at.elapsed() >= DRAIN_TIMEOUT
            {
                debug!(
                    pid = child.id(),
                    program = %program,
                    "Process exited but a descendant still holds its output pipes"
                );
                break Some(status);
            }

            let mut slice = OUTPUT_POLL_INTERVAL;
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break exited.map(|(status, _)| status);
                }
                slice = slice.min(remaining);
            }
            match rx.recv_timeout(slice) {
                Ok((stream, chunk)) => forward(&mut sink, stream, &chunk),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => pipes_open = false,
            }
        };

        match status {
            Some(status) => Ok(ExecutionOutcome::exited(
                status.code(),
                started.elapsed(),
                timeout,
            )),
            None => {
                debug!(pid = child.id(), program = %program, "Process exceeded timeout, terminating");
                platform::terminate(&mut child);

                let drain_deadline = Instant::now() + DRAIN_TIMEOUT;
                while let Ok((stream, chunk)) =
                    rx.recv_timeout(drain_deadline.saturating_duration_since(Instant::now()))
                {
                    forward(&mut sink, stream, &chunk);
                }

                Ok(ExecutionOutcome::timed_out(started.elapsed(), timeout))
            }
        }
    }
}

fn forward(sink: &mut Option<&mut dyn OutputSink>, stream: StreamKind, chunk: &[u8]) {
    if let Some(sink) = sink {
        sink.on_output(stream, chunk);
    }
}

fn spawn_reader<R>(mut pipe: R, stream: StreamKind, tx: Sender<Chunk>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK_BYTES];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    // Receiver gone means the runner gave up on this child
                    if tx.send((stream, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
    });
}

/// Wait for exit until `deadline`; `Ok(None)` means the deadline passed first.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    }
}
