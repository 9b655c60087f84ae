use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// A Composer binary living inside a temporary directory this process created.
///
/// The directory is removed when the value is dropped; [`remove`](Self::remove)
/// does the same but reports failures.
#[derive(Debug)]
pub struct TempInstallation {
    dir: TempDir,
    binary: PathBuf,
}

impl TempInstallation {
    pub(crate) fn new(dir: TempDir, binary: PathBuf) -> Self {
        Self { dir, binary }
    }

    /// The temporary directory holding the installer and the artifact.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of the installed artifact.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Recursively delete the installation directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the tree could not be fully removed.
    pub fn remove(self) -> std::io::Result<()> {
        self.dir.close()
    }
}
