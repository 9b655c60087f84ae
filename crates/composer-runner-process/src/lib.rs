//! Process execution for composer-runner
//!
//! Spawns a single child process, forwards its stdout/stderr live to an optional
//! [`OutputSink`], and enforces a wall-clock timeout.
//!
//! # Security Model
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style invocation.
//! Arguments are handed to the OS as discrete elements and never pass through a
//! shell, so metacharacters such as `;` or `$(...)` reach the child literally.
//! [`CommandSpec::to_command_line`] renders a shell-quoted equivalent for diagnostics only.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod outcome;
mod platform;
pub mod process;
pub mod sink;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use outcome::{ExecutionOutcome, OutcomeStatus};
pub use process::ProcessRunner;
pub use sink::{OutputSink, StreamKind};
