use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// One program invocation: executable, argv and optional working directory.
///
/// Every child process goes through this type. Arguments reach the OS as
/// separate argv entries and no shell is involved, so `;`, `$(...)` or spaces
/// inside an argument stay part of that argument. The child inherits the
/// caller's environment untouched.
///
/// ```rust
/// use composer_runner_process::CommandSpec;
///
/// let cmd = CommandSpec::new("php")
///     .arg("composer.phar")
///     .args(["require", "vendor/pkg"])
///     .cwd("/srv/app");
///
/// assert_eq!(cmd.args.len(), 3);
/// assert_eq!(cmd.to_command_line(), "php composer.phar require vendor/pkg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// `None` runs in the caller's current directory
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Build the `std::process::Command`; stdio is left for the runner to wire.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }

    /// Render the program and arguments as one POSIX shell-quoted line.
    ///
    /// This is what error messages and logs show. Each element is quoted on its
    /// own, so pasting the line into `sh` reproduces exactly the argv that was
    /// executed. Non-UTF-8 elements are rendered lossily.
    ///
    /// ```rust
    /// use composer_runner_process::CommandSpec;
    ///
    /// let cmd = CommandSpec::new("php").arg("composer.phar").arg("a b;c");
    /// assert_eq!(cmd.to_command_line(), "php composer.phar 'a b;c'");
    /// ```
    #[must_use]
    pub fn to_command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| shell_words::quote(&part.to_string_lossy()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::Path;

    #[test]
    fn test_interpreter_binary_and_words_keep_their_order() {
        let cmd = CommandSpec::new("/usr/bin/php")
            .arg("--php-ini=/etc/php.ini")
            .arg("/tmp/composer/composer.phar")
            .args(["install", "--no-dev"])
            .arg("--no-interaction");

        let args: Vec<&OsStr> = cmd.args.iter().map(OsString::as_os_str).collect();
        assert_eq!(
            args,
            [
                "--php-ini=/etc/php.ini",
                "/tmp/composer/composer.phar",
                "install",
                "--no-dev",
                "--no-interaction",
            ]
        );
        assert!(cmd.cwd.is_none());
    }

    #[test]
    fn test_to_command_carries_program_args_and_cwd() {
        let command = CommandSpec::new("php")
            .args(["installer.php", "a;b"])
            .cwd("/tmp/composer-install")
            .to_command();

        assert_eq!(command.get_program(), "php");
        assert_eq!(
            command.get_args().collect::<Vec<_>>(),
            [OsStr::new("installer.php"), OsStr::new("a;b")]
        );
        assert_eq!(
            command.get_current_dir(),
            Some(Path::new("/tmp/composer-install"))
        );
        assert_eq!(command.get_envs().count(), 0);
    }

    #[test]
    fn test_to_command_line_quotes_each_element() {
        let cmd = CommandSpec::new("/usr/bin/php")
            .arg("/tmp/composer x/composer.phar")
            .arg("install")
            .arg("$(rm -rf /)")
            .arg("--no-interaction");

        assert_eq!(
            cmd.to_command_line(),
            "/usr/bin/php '/tmp/composer x/composer.phar' install '$(rm -rf /)' --no-interaction"
        );
    }

    #[test]
    fn test_to_command_line_round_trips_through_shell_split() {
        let cmd = CommandSpec::new("php").args(["it's", "", "semi;colon", "tab\there"]);
        let words = shell_words::split(&cmd.to_command_line()).unwrap();
        assert_eq!(words, vec!["php", "it's", "", "semi;colon", "tab\there"]);
    }
}
