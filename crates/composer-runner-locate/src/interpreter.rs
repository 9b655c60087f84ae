use crate::error::LocateError;
use composer_runner_process::CommandSpec;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables that may point at a PHP binary, in lookup order
pub const INTERPRETER_ENV_VARS: [&str; 3] = ["PHP_BINARY", "PHP_PATH", "PHP_PEAR_PHP_BIN"];

/// Environment variable naming the php.ini file (or its directory)
pub const PHP_INI_ENV_VAR: &str = "PHPRC";

const INTERPRETER_NAME: &str = "php";

/// A resolved interpreter: the executable plus the flags every invocation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Interpreter {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Start a command line with the interpreter and its flags.
    #[must_use]
    pub fn command_spec(&self) -> CommandSpec {
        CommandSpec::new(self.program.as_os_str()).args(self.args.iter().cloned())
    }
}

/// Finds the PHP interpreter and the arguments needed to invoke it.
///
/// Resolution order for the executable:
/// 1. an explicitly configured path (must be executable, otherwise an error)
/// 2. `PHP_BINARY`, `PHP_PATH`, `PHP_PEAR_PHP_BIN` (skipped when not executable)
/// 3. `php` on the search path
#[derive(Debug, Clone, Default)]
pub struct RuntimeLocator {
    explicit: Option<PathBuf>,
    env_candidates: Vec<PathBuf>,
    php_ini: Option<PathBuf>,
    search_path: Option<OsString>,
}

impl RuntimeLocator {
    /// A locator that only consults the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A locator seeded from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var_os(key))
    }

    /// A locator seeded from an arbitrary environment lookup.
    #[must_use]
    pub fn with_env(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let env_candidates = INTERPRETER_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .collect();

        let php_ini = lookup(PHP_INI_ENV_VAR)
            .filter(|value| !value.is_empty())
            .and_then(|value| ini_file_from_phprc(Path::new(&value)));

        Self {
            explicit: None,
            env_candidates,
            php_ini,
            search_path: None,
        }
    }

    /// Use this interpreter instead of searching.
    #[must_use]
    pub fn explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Pass `--php-ini=<path>` to every invocation.
    #[must_use]
    pub fn php_ini(mut self, path: impl Into<PathBuf>) -> Self {
        self.php_ini = Some(path.into());
        self
    }

    /// Search these directories (in `PATH` syntax) instead of the process `PATH`.
    #[must_use]
    pub fn search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Locate the interpreter executable.
    ///
    /// # Errors
    ///
    /// `InterpreterNotExecutable` when an explicit path was configured but is not
    /// usable, `InterpreterNotFound` when nothing was discoverable.
    pub fn find_interpreter(&self) -> Result<PathBuf, LocateError> {
        if let Some(explicit) = &self.explicit {
            return self
                .which(explicit.as_os_str())
                .ok_or_else(|| LocateError::InterpreterNotExecutable {
                    path: explicit.clone(),
                });
        }

        for candidate in &self.env_candidates {
            match self.which(candidate.as_os_str()) {
                Some(path) => return Ok(path),
                None => debug!(candidate = %candidate.display(), "Ignoring unusable interpreter candidate"),
            }
        }

        self.which(OsStr::new(INTERPRETER_NAME))
            .ok_or(LocateError::InterpreterNotFound)
    }

    /// Extra arguments needed to reproduce the configured runtime environment.
    ///
    /// Never fails; missing optional settings just produce fewer arguments.
    #[must_use]
    pub fn find_interpreter_args(&self, interpreter: &Path) -> Vec<OsString> {
        let mut args = Vec::new();

        let is_phpdbg = interpreter
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().starts_with("phpdbg"));
        if is_phpdbg {
            args.push(OsString::from("-qrr"));
        }

        if let Some(ini) = &self.php_ini {
            let mut flag = OsString::from("--php-ini=");
            flag.push(ini.as_os_str());
            args.push(flag);
        }

        args
    }

    /// Resolve the interpreter together with its arguments.
    ///
    /// # Errors
    ///
    /// Same as [`find_interpreter`](Self::find_interpreter).
    pub fn locate(&self) -> Result<Interpreter, LocateError> {
        let program = self.find_interpreter()?;
        let args = self.find_interpreter_args(&program);
        debug!(interpreter = %program.display(), ?args, "Located interpreter");
        Ok(Interpreter { program, args })
    }

    fn which(&self, name: &OsStr) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };
        found.ok()
    }
}

/// `PHPRC` may name the ini file itself or the directory holding `php.ini`.
fn ini_file_from_phprc(value: &Path) -> Option<PathBuf> {
    if value.is_file() {
        return Some(value.to_path_buf());
    }
    let nested = value.join("php.ini");
    nested.is_file().then_some(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(*v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_interpreter_command_spec_includes_args() {
        let interpreter = Interpreter::new("/usr/bin/php").with_args(["--php-ini=/etc/php.ini"]);
        let spec = interpreter.command_spec().arg("composer.phar");
        assert_eq!(spec.program, OsString::from("/usr/bin/php"));
        assert_eq!(
            spec.args,
            vec![
                OsString::from("--php-ini=/etc/php.ini"),
                OsString::from("composer.phar")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_interpreter_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let php = make_executable(dir.path(), "php");

        let locator = RuntimeLocator::new().search_path(dir.path().as_os_str());
        assert_eq!(locator.find_interpreter().unwrap(), php);
    }

    #[test]
    fn test_find_interpreter_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let locator = RuntimeLocator::new().search_path(dir.path().as_os_str());
        assert!(matches!(
            locator.find_interpreter(),
            Err(LocateError::InterpreterNotFound)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_candidate_wins_over_search_path() {
        let path_dir = tempfile::tempdir().unwrap();
        let env_dir = tempfile::tempdir().unwrap();
        make_executable(path_dir.path(), "php");
        let env_php = make_executable(env_dir.path(), "php8.3");
        let env_php_str = env_php.to_string_lossy().into_owned();

        let locator = RuntimeLocator::with_env(env_of(&[("PHP_PATH", &env_php_str)]))
            .search_path(path_dir.path().as_os_str());
        assert_eq!(locator.find_interpreter().unwrap(), env_php);
    }

    #[cfg(unix)]
    #[test]
    fn test_unusable_env_candidate_is_skipped() {
        let path_dir = tempfile::tempdir().unwrap();
        let php = make_executable(path_dir.path(), "php");

        let locator = RuntimeLocator::with_env(env_of(&[("PHP_BINARY", "/nonexistent/php")]))
            .search_path(path_dir.path().as_os_str());
        assert_eq!(locator.find_interpreter().unwrap(), php);
    }

    #[test]
    fn test_explicit_interpreter_must_exist() {
        let locator = RuntimeLocator::new().explicit("/nonexistent/bin/php");
        match locator.find_interpreter() {
            Err(LocateError::InterpreterNotExecutable { path }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/bin/php"));
            }
            other => panic!("Expected InterpreterNotExecutable, got {other:?}"),
        }
    }

    #[test]
    fn test_interpreter_args_empty_by_default() {
        let locator = RuntimeLocator::new();
        assert!(locator.find_interpreter_args(Path::new("/usr/bin/php")).is_empty());
    }

    #[test]
    fn test_interpreter_args_phpdbg_and_ini() {
        let locator = RuntimeLocator::new().php_ini("/etc/php/8.3/cli/php.ini");
        let args = locator.find_interpreter_args(Path::new("/usr/bin/phpdbg8.3"));
        assert_eq!(
            args,
            vec![
                OsString::from("-qrr"),
                OsString::from("--php-ini=/etc/php/8.3/cli/php.ini")
            ]
        );
    }

    #[test]
    fn test_phprc_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ini = dir.path().join("php.ini");
        fs::write(&ini, "memory_limit=-1\n").unwrap();
        let dir_str = dir.path().to_string_lossy().into_owned();
        let ini_str = ini.to_string_lossy().into_owned();

        let from_dir = RuntimeLocator::with_env(env_of(&[("PHPRC", &dir_str)]));
        let from_file = RuntimeLocator::with_env(env_of(&[("PHPRC", &ini_str)]));
        let mut expected = OsString::from("--php-ini=");
        expected.push(&ini);

        assert_eq!(from_dir.find_interpreter_args(Path::new("php")), vec![expected.clone()]);
        assert_eq!(from_file.find_interpreter_args(Path::new("php")), vec![expected]);
    }

    #[test]
    fn test_phprc_pointing_nowhere_is_ignored() {
        let locator = RuntimeLocator::with_env(env_of(&[("PHPRC", "/nonexistent/ini/dir")]));
        assert!(locator.find_interpreter_args(Path::new("php")).is_empty());
    }
}
