use composer_runner_install::{COMPOSER_INSTALLER_URL, DEFAULT_PROCESS_TIMEOUT};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env(String),
    ConfigFile(PathBuf),
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Env(var) => write!(f, "env:{var}"),
            Self::ConfigFile(path) => write!(f, "config:{}", path.display()),
            Self::Default => write!(f, "default"),
        }
    }
}

/// `[runner]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Timeout for Composer commands and installer runs, in seconds
    pub timeout_secs: u64,
    /// Also look for a binary in the working directory and its ancestors
    pub search_ancestors: bool,
    /// Parent directory for temporary installations; system default when unset
    pub temp_dir: Option<PathBuf>,
    /// Working directory for Composer commands; inherited when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_PROCESS_TIMEOUT.as_secs(),
            search_ancestors: true,
            temp_dir: None,
            working_dir: None,
        }
    }
}

/// `[php]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhpSettings {
    pub binary: Option<PathBuf>,
    pub ini: Option<PathBuf>,
}

/// `[installer]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerSettings {
    pub url: String,
    /// Pinned SHA-384 of the installer script, lowercase hex
    pub sha384: Option<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            url: COMPOSER_INSTALLER_URL.to_string(),
            sha384: None,
        }
    }
}

/// Effective configuration after all sources have been merged.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub runner: RunnerSettings,
    pub php: PhpSettings,
    pub installer: InstallerSettings,
    /// The config file that contributed values, if any
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.runner.timeout_secs)
    }

    /// Source of `key`, `Default` when never overridden.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Default)
    }
}

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub runner: Option<TomlRunner>,
    pub php: Option<TomlPhp>,
    pub installer: Option<TomlInstaller>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlRunner {
    pub timeout_secs: Option<u64>,
    pub search_ancestors: Option<bool>,
    pub temp_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlPhp {
    pub binary: Option<PathBuf>,
    pub ini: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlInstaller {
    pub url: Option<String>,
    pub sha384: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_installer_constants() {
        let config = Config::default();
        assert_eq!(config.runner.timeout_secs, 5000);
        assert!(config.runner.search_ancestors);
        assert_eq!(config.installer.url, "https://getcomposer.org/installer");
        assert!(config.installer.sha384.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(5000));
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(ConfigSource::Cli.to_string(), "cli");
        assert_eq!(
            ConfigSource::Env("COMPOSER_RUNNER_PHP".to_string()).to_string(),
            "env:COMPOSER_RUNNER_PHP"
        );
        assert_eq!(
            ConfigSource::ConfigFile(PathBuf::from("/p/.composer-runner.toml")).to_string(),
            "config:/p/.composer-runner.toml"
        );
        assert_eq!(Config::default().source_of("timeout_secs"), ConfigSource::Default);
    }
}
