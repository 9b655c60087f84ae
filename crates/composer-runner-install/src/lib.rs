//! Fallback acquisition of the Composer binary.
//!
//! When no `composer` executable is present on the host, the official installer
//! script is fetched, written into a fresh temporary directory and executed with
//! the PHP interpreter. A successful run leaves `composer.phar` behind, which is
//! handed back as a [`TempInstallation`] that owns the directory.

pub mod error;
pub mod installation;
pub mod installer;
pub mod source;
pub mod verify;

use std::time::Duration;

pub use error::InstallError;
pub use installation::TempInstallation;
pub use installer::Installer;
pub use source::{HttpInstallerSource, InstallerSource};
pub use verify::{sha384_hex, verify_sha384};

/// Where the bootstrap installer is downloaded from
pub const COMPOSER_INSTALLER_URL: &str = "https://getcomposer.org/installer";

/// File name the downloaded installer is written to
pub const INSTALLER_SCRIPT_NAME: &str = "installer.php";

/// Artifact a successful bootstrap run leaves in its working directory
pub const INSTALLED_ARTIFACT_NAME: &str = "composer.phar";

/// Prefix of every temporary installation directory
pub const TEMP_PREFIX: &str = "composer";

/// Appended to every Composer invocation
pub const NON_INTERACTIVE_FLAG: &str = "--no-interaction";

/// Standard timeout for bootstrap runs and Composer commands
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(5000);
