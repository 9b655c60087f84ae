use thiserror::Error;

/// Failures of the fallback install path.
///
/// None of these escape the runner's public API directly; they are logged and
/// reported as "binary not found".
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Failed to prepare installation directory: {reason}")]
    Workspace { reason: String },

    #[error("Failed to download installer from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Installer digest mismatch: expected sha384 {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("Installer bootstrap failed: {reason}")]
    BootstrapFailed { reason: String },
}

impl InstallError {
    /// Short machine-readable kind, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Workspace { .. } => "workspace",
            Self::DownloadFailed { .. } => "download_failed",
            Self::IntegrityMismatch { .. } => "integrity_mismatch",
            Self::BootstrapFailed { .. } => "bootstrap_failed",
        }
    }
}
