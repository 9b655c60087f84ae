use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli_args::CliArgs;
use crate::error::ConfigError;
use crate::model::{Config, ConfigSource, TomlConfig};

/// Name of the config file looked up from the working directory upwards
pub const CONFIG_FILE_NAME: &str = ".composer-runner.toml";

pub const ENV_PHP: &str = "COMPOSER_RUNNER_PHP";
pub const ENV_TIMEOUT: &str = "COMPOSER_RUNNER_TIMEOUT";
pub const ENV_INSTALLER_URL: &str = "COMPOSER_RUNNER_INSTALLER_URL";
pub const ENV_INSTALLER_SHA384: &str = "COMPOSER_RUNNER_INSTALLER_SHA384";

const REPO_ROOT_MARKERS: [&str; 3] = [".git", ".hg", ".svn"];

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery and the
    /// process environment for overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined, a config
    /// file cannot be read or parsed, or the merged configuration is invalid.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::CurrentDir {
            reason: e.to_string(),
        })?;
        Self::discover_from(&start_dir, cli_args, |key| std::env::var(key).ok())
    }

    /// Discover configuration starting from a specific directory with an
    /// injected environment lookup.
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    ///
    /// # Errors
    ///
    /// Same as [`discover`](Self::discover).
    pub fn discover_from(
        start_dir: &Path,
        cli_args: &CliArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "Loading config file");
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config, path);
            config.config_path = Some(path.clone());
        }

        config.apply_env(&env)?;
        config.apply_cli(cli_args);

        config.validate()?;
        Ok(config)
    }

    /// Walk up from `start_dir` looking for [`CONFIG_FILE_NAME`], stopping at a
    /// repository root (.git, .hg, .svn) or the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if REPO_ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
                break;
            }
        }
        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Directory-valued settings in a file are relative to the file itself.
    fn apply_file(&mut self, file: TomlConfig, path: &Path) {
        let source = ConfigSource::ConfigFile(path.to_path_buf());
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let anchor = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        if let Some(runner) = file.runner {
            if let Some(timeout) = runner.timeout_secs {
                self.runner.timeout_secs = timeout;
                self.attribute("timeout_secs", &source);
            }
            if let Some(search) = runner.search_ancestors {
                self.runner.search_ancestors = search;
                self.attribute("search_ancestors", &source);
            }
            if let Some(temp_dir) = runner.temp_dir {
                self.runner.temp_dir = Some(anchor(temp_dir));
                self.attribute("temp_dir", &source);
            }
            if let Some(working_dir) = runner.working_dir {
                self.runner.working_dir = Some(anchor(working_dir));
                self.attribute("working_dir", &source);
            }
        }

        if let Some(php) = file.php {
            // A bare binary name is looked up on PATH, so only anchor real paths
            if let Some(binary) = php.binary {
                self.php.binary = Some(if binary.components().count() > 1 {
                    anchor(binary)
                } else {
                    binary
                });
                self.attribute("php_binary", &source);
            }
            if let Some(ini) = php.ini {
                self.php.ini = Some(anchor(ini));
                self.attribute("php_ini", &source);
            }
        }

        if let Some(installer) = file.installer {
            if let Some(url) = installer.url {
                self.installer.url = url;
                self.attribute("installer_url", &source);
            }
            if let Some(sha384) = installer.sha384 {
                self.installer.sha384 = Some(sha384.trim().to_ascii_lowercase());
                self.attribute("installer_sha384", &source);
            }
        }
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(php) = lookup(ENV_PHP) {
            self.php.binary = Some(PathBuf::from(php));
            self.attribute("php_binary", &ConfigSource::Env(ENV_PHP.to_string()));
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            let secs = timeout.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT.to_string(),
                value: format!("'{timeout}' is not a whole number of seconds"),
            })?;
            self.runner.timeout_secs = secs;
            self.attribute("timeout_secs", &ConfigSource::Env(ENV_TIMEOUT.to_string()));
        }
        if let Some(url) = lookup(ENV_INSTALLER_URL) {
            self.installer.url = url;
            self.attribute(
                "installer_url",
                &ConfigSource::Env(ENV_INSTALLER_URL.to_string()),
            );
        }
        if let Some(sha384) = lookup(ENV_INSTALLER_SHA384) {
            self.installer.sha384 = Some(sha384.trim().to_ascii_lowercase());
            self.attribute(
                "installer_sha384",
                &ConfigSource::Env(ENV_INSTALLER_SHA384.to_string()),
            );
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli_args: &CliArgs) {
        if let Some(binary) = &cli_args.php_binary {
            self.php.binary = Some(binary.clone());
            self.attribute("php_binary", &ConfigSource::Cli);
        }
        if let Some(timeout) = cli_args.timeout_secs {
            self.runner.timeout_secs = timeout;
            self.attribute("timeout_secs", &ConfigSource::Cli);
        }
    }

    fn attribute(&mut self, key: &str, source: &ConfigSource) {
        self.source_attribution.insert(key.to_string(), source.clone());
    }
}
