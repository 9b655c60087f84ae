//! The public runner: resolve Composer, run commands, clean up after ourselves.
//!
//! One [`ComposerRunner`] is one non-reentrant session. It lazily resolves the
//! PHP interpreter, finds `composer` on the host or installs it into a private
//! temporary directory, and removes that directory on explicit [`cleanup`],
//! after any failed command, and when the runner is dropped.
//!
//! [`cleanup`]: ComposerRunner::cleanup

use composer_runner_config::Config;
use composer_runner_install::{
    DEFAULT_PROCESS_TIMEOUT, HttpInstallerSource, Installer, InstallerSource, NON_INTERACTIVE_FLAG,
    TempInstallation,
};
use composer_runner_locate::{BinaryLocator, Interpreter, RuntimeLocator, ancestor_dirs};
use composer_runner_process::{
    ExecutionOutcome, NativeRunner, OutcomeStatus, OutputSink, ProcessRunner,
};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ComposerRunnerError;

/// Executable name searched for on the host
pub const COMPOSER_BINARY_NAME: &str = "composer";

/// Suffixes accepted after [`COMPOSER_BINARY_NAME`]
pub const COMPOSER_BINARY_SUFFIXES: [&str; 1] = ["phar"];

/// Who owns a resolved binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOrigin {
    /// Found on the host; never deleted by this crate
    Host,
    /// Lives inside this runner's temporary installation
    Installed,
}

impl BinaryOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Installed => "installed",
        }
    }
}

impl fmt::Display for BinaryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An absolute path to a usable Composer binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    pub origin: BinaryOrigin,
}

/// Resolves and drives Composer.
///
/// Not safe for overlapping use: the cached installation is plain mutable
/// state. Use one runner per concurrent task.
///
/// # Example
///
/// ```rust,no_run
/// use composer_runner::{ComposerRunner, StreamKind};
/// use std::time::Duration;
///
/// let mut runner = ComposerRunner::builder().build();
/// let mut sink = |stream: StreamKind, chunk: &[u8]| {
///     eprint!("[{stream}] {}", String::from_utf8_lossy(chunk));
/// };
/// runner.execute("install", &["--dry-run"], Some(&mut sink), Duration::from_secs(600))?;
/// # Ok::<(), composer_runner::ComposerRunnerError>(())
/// ```
pub struct ComposerRunner {
    process_runner: Box<dyn ProcessRunner>,
    installer_source: Box<dyn InstallerSource>,
    runtime_locator: RuntimeLocator,
    binary_locator: BinaryLocator,
    working_dir: Option<PathBuf>,
    search_ancestors: bool,
    temp_root: Option<PathBuf>,
    installer_sha384: Option<String>,
    default_timeout: Duration,
    interpreter: Option<Interpreter>,
    installation: Option<TempInstallation>,
}

impl ComposerRunner {
    #[must_use]
    pub fn builder() -> ComposerRunnerBuilder {
        ComposerRunnerBuilder::new()
    }

    /// A runner configured from merged configuration, using the real process
    /// runner and the HTTP installer source.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        ComposerRunnerBuilder::from_config(config).build()
    }

    /// Timeout used when the caller has no better value.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Directory of the live temporary installation, if any.
    #[must_use]
    pub fn installation_dir(&self) -> Option<&Path> {
        self.installation.as_ref().map(TempInstallation::dir)
    }

    /// Resolve the Composer binary.
    ///
    /// The host is always searched first. Otherwise a live temporary
    /// installation is reused, and only then is one installation attempted.
    /// A failed attempt is not remembered, so a later call tries again.
    ///
    /// # Errors
    ///
    /// `InterpreterNotFound` when an install is needed but PHP is missing,
    /// `BinaryNotFound` when the install attempt fails.
    pub fn find_composer(&mut self) -> Result<ResolvedBinary, ComposerRunnerError> {
        let extra_dirs = self.extra_search_dirs();
        if let Some(path) =
            self.binary_locator
                .find(COMPOSER_BINARY_NAME, &COMPOSER_BINARY_SUFFIXES, &extra_dirs)
        {
            debug!(binary = %path.display(), "Using host composer");
            return Ok(ResolvedBinary {
                path,
                origin: BinaryOrigin::Host,
            });
        }

        if let Some(installation) = &self.installation {
            debug!(binary = %installation.binary().display(), "Reusing temporary composer");
            return Ok(ResolvedBinary {
                path: installation.binary().to_path_buf(),
                origin: BinaryOrigin::Installed,
            });
        }

        let interpreter = self.interpreter()?;
        let installer = Installer::new(
            self.installer_source.as_ref(),
            &interpreter,
            self.process_runner.as_ref(),
        )
        .timeout(self.default_timeout)
        .temp_root(self.temp_root.clone())
        .expected_sha384(self.installer_sha384.clone());

        match installer.install() {
            Ok(installation) => {
                let path = installation.binary().to_path_buf();
                self.installation = Some(installation);
                Ok(ResolvedBinary {
                    path,
                    origin: BinaryOrigin::Installed,
                })
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Composer installation failed");
                Err(ComposerRunnerError::BinaryNotFound {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run `composer <command> <arguments...> --no-interaction`.
    ///
    /// `command` is split into words with POSIX shell rules (so
    /// `"require vendor/pkg"` works); each of `arguments` is passed as one
    /// literal argument. Output is forwarded live to `sink`, or discarded.
    ///
    /// # Errors
    ///
    /// `InvalidCommand` for an empty or unbalanced `command`, any resolution
    /// error from [`find_composer`](Self::find_composer), and `CommandFailed`
    /// when the process cannot be spawned, exits non-zero or times out. Any
    /// temporary installation has been removed before `CommandFailed` is
    /// returned.
    pub fn execute<S: AsRef<OsStr>>(
        &mut self,
        command: &str,
        arguments: &[S],
        sink: Option<&mut dyn OutputSink>,
        timeout: Duration,
    ) -> Result<ExecutionOutcome, ComposerRunnerError> {
        let words = split_command(command)?;
        let binary = self.find_composer()?;
        let interpreter = self.interpreter()?;

        let mut cmd = interpreter
            .command_spec()
            .arg(&binary.path)
            .args(words)
            .args(arguments.iter().map(|arg| arg.as_ref().to_os_string()))
            .arg(NON_INTERACTIVE_FLAG);
        if let Some(dir) = &self.working_dir {
            cmd = cmd.cwd(dir);
        }
        let command_line = cmd.to_command_line();
        info!(command = %command_line, origin = %binary.origin, "Running composer");

        let failure = match self.process_runner.run(&cmd, timeout, sink) {
            Ok(outcome) if outcome.success() => {
                info!(elapsed_ms = outcome.elapsed.as_millis(), "Composer finished");
                return Ok(outcome);
            }
            Ok(outcome) => ComposerRunnerError::CommandFailed {
                command: command_line,
                exit_code: outcome.exit_code,
                timed_out: outcome.status == OutcomeStatus::TimedOut,
                reason: outcome.describe(),
            },
            Err(e) => ComposerRunnerError::CommandFailed {
                command: command_line,
                exit_code: None,
                timed_out: false,
                reason: e.to_string(),
            },
        };

        warn!(error = %failure, "Composer command failed");
        self.cleanup();
        Err(failure)
    }

    /// Remove the temporary installation, if any. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        let Some(installation) = self.installation.take() else {
            return;
        };
        let dir = installation.dir().to_path_buf();
        match installation.remove() {
            Ok(()) => debug!(dir = %dir.display(), "Removed temporary composer"),
            Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to remove temporary composer"),
        }
    }

    fn interpreter(&mut self) -> Result<Interpreter, ComposerRunnerError> {
        if let Some(interpreter) = &self.interpreter {
            return Ok(interpreter.clone());
        }
        let interpreter = self.runtime_locator.locate()?;
        self.interpreter = Some(interpreter.clone());
        Ok(interpreter)
    }

    fn extra_search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_ancestors {
            return Vec::new();
        }
        let start = match &self.working_dir {
            Some(dir) => std::path::absolute(dir).unwrap_or_else(|_| dir.clone()),
            None => match std::env::current_dir() {
                Ok(dir) => dir,
                Err(e) => {
                    debug!(error = %e, "No current directory, skipping ancestor search");
                    return Vec::new();
                }
            },
        };
        ancestor_dirs(&start)
    }
}

impl Drop for ComposerRunner {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl fmt::Debug for ComposerRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposerRunner")
            .field("installer_source", &self.installer_source.describe())
            .field("working_dir", &self.working_dir)
            .field("search_ancestors", &self.search_ancestors)
            .field("default_timeout", &self.default_timeout)
            .field("installation", &self.installation)
            .finish_non_exhaustive()
    }
}

fn split_command(command: &str) -> Result<Vec<String>, ComposerRunnerError> {
    let words = shell_words::split(command).map_err(|e| ComposerRunnerError::InvalidCommand {
        command: command.to_string(),
        reason: e.to_string(),
    })?;
    if words.is_empty() {
        return Err(ComposerRunnerError::InvalidCommand {
            command: command.to_string(),
            reason: "command is empty".to_string(),
        });
    }
    Ok(words)
}

/// Builder for [`ComposerRunner`]; unset collaborators default to the real ones.
#[derive(Default)]
pub struct ComposerRunnerBuilder {
    process_runner: Option<Box<dyn ProcessRunner>>,
    installer_source: Option<Box<dyn InstallerSource>>,
    runtime_locator: Option<RuntimeLocator>,
    binary_locator: Option<BinaryLocator>,
    working_dir: Option<PathBuf>,
    search_ancestors: Option<bool>,
    temp_root: Option<PathBuf>,
    installer_sha384: Option<String>,
    default_timeout: Option<Duration>,
}

impl ComposerRunnerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut locator = RuntimeLocator::from_env();
        if let Some(binary) = &config.php.binary {
            locator = locator.explicit(binary);
        }
        if let Some(ini) = &config.php.ini {
            locator = locator.php_ini(ini);
        }

        let mut builder = Self::new()
            .runtime_locator(locator)
            .installer_source(HttpInstallerSource::new(config.installer.url.clone()))
            .search_ancestors(config.runner.search_ancestors)
            .default_timeout(config.timeout());
        builder.working_dir = config.runner.working_dir.clone();
        builder.temp_root = config.runner.temp_dir.clone();
        builder.installer_sha384 = config.installer.sha384.clone();
        builder
    }

    #[must_use]
    pub fn process_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.process_runner = Some(Box::new(runner));
        self
    }

    #[must_use]
    pub fn installer_source(mut self, source: impl InstallerSource + 'static) -> Self {
        self.installer_source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn runtime_locator(mut self, locator: RuntimeLocator) -> Self {
        self.runtime_locator = Some(locator);
        self
    }

    #[must_use]
    pub fn binary_locator(mut self, locator: BinaryLocator) -> Self {
        self.binary_locator = Some(locator);
        self
    }

    /// Run Composer in `dir` and search it (and its ancestors) for a binary.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn search_ancestors(mut self, enabled: bool) -> Self {
        self.search_ancestors = Some(enabled);
        self
    }

    /// Create temporary installations under `dir`.
    #[must_use]
    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    /// Pin the installer script to this SHA-384 hex digest.
    #[must_use]
    pub fn installer_sha384(mut self, digest: impl Into<String>) -> Self {
        self.installer_sha384 = Some(digest.into());
        self
    }

    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn build(self) -> ComposerRunner {
        ComposerRunner {
            process_runner: self
                .process_runner
                .unwrap_or_else(|| Box::new(NativeRunner::new())),
            installer_source: self
                .installer_source
                .unwrap_or_else(|| Box::new(HttpInstallerSource::default())),
            runtime_locator: self.runtime_locator.unwrap_or_else(RuntimeLocator::from_env),
            binary_locator: self.binary_locator.unwrap_or_else(BinaryLocator::from_env),
            working_dir: self.working_dir,
            search_ancestors: self.search_ancestors.unwrap_or(true),
            temp_root: self.temp_root,
            installer_sha384: self.installer_sha384,
            default_timeout: self.default_timeout.unwrap_or(DEFAULT_PROCESS_TIMEOUT),
            interpreter: None,
            installation: None,
        }
    }
}
