use crate::error::InstallError;
use crate::installation::TempInstallation;
use crate::source::InstallerSource;
use crate::verify::verify_sha384;
use crate::{
    DEFAULT_PROCESS_TIMEOUT, INSTALLED_ARTIFACT_NAME, INSTALLER_SCRIPT_NAME, NON_INTERACTIVE_FLAG,
    TEMP_PREFIX,
};
use composer_runner_locate::Interpreter;
use composer_runner_process::{ProcessRunner, StreamKind};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// Downloads and runs the bootstrap installer into a fresh temporary directory.
///
/// Each call to [`install`](Self::install) is a single attempt; caching the
/// result is the caller's business.
pub struct Installer<'a> {
    source: &'a dyn InstallerSource,
    interpreter: &'a Interpreter,
    runner: &'a dyn ProcessRunner,
    timeout: Duration,
    temp_root: Option<PathBuf>,
    expected_sha384: Option<String>,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn InstallerSource,
        interpreter: &'a Interpreter,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            source,
            interpreter,
            runner,
            timeout: DEFAULT_PROCESS_TIMEOUT,
            temp_root: None,
            expected_sha384: None,
        }
    }

    /// Timeout for the bootstrap run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create the temporary directory under `root` instead of the system default.
    #[must_use]
    pub fn temp_root(mut self, root: Option<PathBuf>) -> Self {
        self.temp_root = root;
        self
    }

    /// Refuse to run an installer whose SHA-384 differs from `digest`.
    #[must_use]
    pub fn expected_sha384(mut self, digest: Option<String>) -> Self {
        self.expected_sha384 = digest;
        self
    }

    /// Download, verify and run the installer.
    ///
    /// On success the returned installation owns the temporary directory. On
    /// any failure the directory has already been removed.
    ///
    /// # Errors
    ///
    /// See [`InstallError`].
    pub fn install(&self) -> Result<TempInstallation, InstallError> {
        let dir = self.create_dir()?;
        debug!(dir = %dir.path().display(), "Created installation directory");

        let bytes = self.source.fetch()?;
        if let Some(expected) = &self.expected_sha384 {
            verify_sha384(&bytes, expected)?;
        }

        let script = dir.path().join(INSTALLER_SCRIPT_NAME);
        fs::write(&script, &bytes).map_err(|e| InstallError::Workspace {
            reason: format!("failed to write {}: {e}", script.display()),
        })?;

        let cmd = self
            .interpreter
            .command_spec()
            .arg(&script)
            .arg(NON_INTERACTIVE_FLAG)
            .cwd(dir.path());
        info!(source = %self.source.describe(), command = %cmd.to_command_line(), "Running Composer installer");

        let mut forward = |stream: StreamKind, chunk: &[u8]| {
            debug!(%stream, output = %String::from_utf8_lossy(chunk).trim_end(), "installer");
        };
        let outcome = self
            .runner
            .run(&cmd, self.timeout, Some(&mut forward))
            .map_err(|e| InstallError::BootstrapFailed {
                reason: e.to_string(),
            })?;
        if !outcome.success() {
            return Err(InstallError::BootstrapFailed {
                reason: format!("installer {}", outcome.describe()),
            });
        }

        let binary = dir.path().join(INSTALLED_ARTIFACT_NAME);
        if !binary.is_file() {
            return Err(InstallError::BootstrapFailed {
                reason: format!("installer did not produce {INSTALLED_ARTIFACT_NAME}"),
            });
        }

        info!(binary = %binary.display(), "Installed Composer");
        Ok(TempInstallation::new(dir, binary))
    }

    fn create_dir(&self) -> Result<TempDir, InstallError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let created = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|e| InstallError::Workspace {
            reason: format!("failed to create temporary directory: {e}"),
        })
    }
}
