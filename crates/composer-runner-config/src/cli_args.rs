use std::path::PathBuf;

/// Overrides supplied on the command line; every `Some` beats all other sources.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file, disables upward discovery
    pub config_path: Option<PathBuf>,
    pub php_binary: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}
