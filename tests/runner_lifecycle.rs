//! End-to-end lifecycle tests against real processes.
//!
//! `/bin/sh` stands in for PHP: the "installer" is a shell script that writes a
//! shell-script `composer.phar`, so the full locate → install → execute →
//! cleanup path runs without PHP or network access.

#![cfg(unix)]

use std::cell::Cell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use composer_runner::{
    BinaryLocator, BinaryOrigin, ComposerRunner, ComposerRunnerError, InstallError,
    InstallerSource, NativeRunner, RuntimeLocator, StreamKind,
};
use tempfile::TempDir;

/// Fake composer: `fail` exits 3, `hang` sleeps, anything else echoes its argv.
const FAKE_COMPOSER: &str = r#"case "$1" in
  fail) echo "Your requirements could not be resolved" >&2; exit 3 ;;
  hang) sleep 30 ;;
esac
for arg in "$@"; do printf '<%s>\n' "$arg"; done
"#;

#[derive(Clone, Default)]
struct ScriptSource {
    fetches: Rc<Cell<usize>>,
    fail: bool,
}

impl InstallerSource for ScriptSource {
    fn fetch(&self) -> Result<Vec<u8>, InstallError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail {
            return Err(InstallError::DownloadFailed {
                url: self.describe(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(format!("cat > composer.phar <<'PHAR'\n{FAKE_COMPOSER}PHAR\n").into_bytes())
    }

    fn describe(&self) -> String {
        "test://installer".to_string()
    }
}

struct Env {
    temp_root: TempDir,
    project: TempDir,
    empty_path: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            temp_root: tempfile::tempdir().unwrap(),
            project: tempfile::tempdir().unwrap(),
            empty_path: tempfile::tempdir().unwrap(),
        }
    }

    fn runner(&self, source: ScriptSource) -> ComposerRunner {
        self.runner_with_path(source, self.empty_path.path())
    }

    fn runner_with_path(&self, source: ScriptSource, search_path: &Path) -> ComposerRunner {
        ComposerRunner::builder()
            .process_runner(NativeRunner::new())
            .installer_source(source)
            .runtime_locator(RuntimeLocator::with_env(|_| None).explicit("/bin/sh"))
            .binary_locator(BinaryLocator::with_search_path(search_path.as_os_str()))
            .working_dir(self.project.path())
            .search_ancestors(false)
            .temp_root(self.temp_root.path())
            .default_timeout(Duration::from_secs(10))
            .build()
    }

    fn temp_entries(&self) -> usize {
        fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

fn stdout_of(chunks: &[(StreamKind, Vec<u8>)]) -> String {
    chunks
        .iter()
        .filter(|(stream, _)| *stream == StreamKind::Stdout)
        .map(|(_, chunk)| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

#[test]
fn test_install_run_and_cleanup() {
    let env = Env::new();
    let source = ScriptSource::default();
    let mut runner = env.runner(source.clone());

    let mut chunks = Vec::new();
    let mut sink = |stream: StreamKind, chunk: &[u8]| chunks.push((stream, chunk.to_vec()));
    let outcome = runner
        .execute("install", &["--no-dev"], Some(&mut sink), Duration::from_secs(10))
        .unwrap();

    assert!(outcome.success());
    assert_eq!(
        stdout_of(&chunks),
        "<install>\n<--no-dev>\n<--no-interaction>\n"
    );
    assert_eq!(source.fetches.get(), 1);

    let dir = runner.installation_dir().unwrap().to_path_buf();
    assert!(dir.starts_with(env.temp_root.path()));
    assert!(dir.join("composer.phar").exists());

    runner.cleanup();
    assert!(!dir.exists());
    assert_eq!(env.temp_entries(), 0);

    // Idempotent
    runner.cleanup();
}

#[test]
fn test_installation_is_reused_across_commands() {
    let env = Env::new();
    let source = ScriptSource::default();
    let mut runner = env.runner(source.clone());

    let first = runner.find_composer().unwrap();
    let second = runner.find_composer().unwrap();
    runner
        .execute::<&str>("validate", &[], None, Duration::from_secs(10))
        .unwrap();

    assert_eq!(first.origin, BinaryOrigin::Installed);
    assert_eq!(first, second);
    assert_eq!(source.fetches.get(), 1);
    assert_eq!(env.temp_entries(), 1);
}

#[test]
fn test_host_composer_is_preferred() {
    let env = Env::new();
    let bin = tempfile::tempdir().unwrap();
    let host = bin.path().join("composer");
    fs::write(&host, FAKE_COMPOSER).unwrap();
    fs::set_permissions(&host, fs::Permissions::from_mode(0o755)).unwrap();

    let source = ScriptSource::default();
    let mut runner = env.runner_with_path(source.clone(), bin.path());

    let resolved = runner.find_composer().unwrap();
    assert_eq!(resolved.origin, BinaryOrigin::Host);
    assert_eq!(resolved.path, host);

    let mut chunks = Vec::new();
    let mut sink = |stream: StreamKind, chunk: &[u8]| chunks.push((stream, chunk.to_vec()));
    runner
        .execute("show", &["-i"], Some(&mut sink), Duration::from_secs(10))
        .unwrap();

    assert_eq!(stdout_of(&chunks), "<show>\n<-i>\n<--no-interaction>\n");
    assert_eq!(source.fetches.get(), 0);
    assert!(runner.installation_dir().is_none());
    assert_eq!(env.temp_entries(), 0);
}

#[test]
fn test_download_failure_is_binary_not_found() {
    let env = Env::new();
    let source = ScriptSource {
        fail: true,
        ..ScriptSource::default()
    };
    let mut runner = env.runner(source.clone());

    let err = runner
        .execute::<&str>("install", &[], None, Duration::from_secs(10))
        .unwrap_err();

    match &err {
        ComposerRunnerError::BinaryNotFound { reason } => {
            assert!(reason.contains("connection refused"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("Cannot find composer"));
    assert_eq!(env.temp_entries(), 0);

    // Not remembered: the next call tries again
    let _ = runner.find_composer();
    assert_eq!(source.fetches.get(), 2);
}

#[test]
fn test_nonzero_exit_streams_output_then_cleans_up() {
    let env = Env::new();
    let mut runner = env.runner(ScriptSource::default());

    let mut chunks = Vec::new();
    let mut sink = |stream: StreamKind, chunk: &[u8]| chunks.push((stream, chunk.to_vec()));
    let err = runner
        .execute::<&str>("fail", &[], Some(&mut sink), Duration::from_secs(10))
        .unwrap_err();

    match &err {
        ComposerRunnerError::CommandFailed {
            command,
            exit_code,
            timed_out,
            ..
        } => {
            assert!(command.ends_with("fail --no-interaction"), "{command}");
            assert_eq!(*exit_code, Some(3));
            assert!(!timed_out);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(
        err.to_string()
            .starts_with("An error occurred when executing the \"")
    );

    let stderr: Vec<u8> = chunks
        .iter()
        .filter(|(stream, _)| *stream == StreamKind::Stderr)
        .flat_map(|(_, chunk)| chunk.clone())
        .collect();
    assert_eq!(stderr, b"Your requirements could not be resolved\n");

    assert!(runner.installation_dir().is_none());
    assert_eq!(env.temp_entries(), 0);
}

#[test]
fn test_timeout_kills_process_and_cleans_up() {
    let env = Env::new();
    let mut runner = env.runner(ScriptSource::default());
    runner.find_composer().unwrap();

    let started = std::time::Instant::now();
    let err = runner
        .execute::<&str>("hang", &[], None, Duration::from_millis(500))
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(
        err,
        ComposerRunnerError::CommandFailed {
            timed_out: true,
            exit_code: None,
            ..
        }
    ));
    assert_eq!(err.to_exit_code().as_i32(), 124);
    assert_eq!(env.temp_entries(), 0);
}

#[test]
fn test_arguments_are_never_shell_interpreted() {
    let env = Env::new();
    let mut runner = env.runner(ScriptSource::default());

    let hostile = ["a b", "$(touch pwned)", "; touch pwned2", "*", "`id`"];
    let mut chunks = Vec::new();
    let mut sink = |stream: StreamKind, chunk: &[u8]| chunks.push((stream, chunk.to_vec()));
    runner
        .execute("run-script", &hostile, Some(&mut sink), Duration::from_secs(10))
        .unwrap();

    assert_eq!(
        stdout_of(&chunks),
        "<run-script>\n<a b>\n<$(touch pwned)>\n<; touch pwned2>\n<*>\n<`id`>\n<--no-interaction>\n"
    );
    assert!(!env.project.path().join("pwned").exists());
    assert!(!env.project.path().join("pwned2").exists());
}

#[test]
fn test_multi_word_command_is_split() {
    let env = Env::new();
    let mut runner = env.runner(ScriptSource::default());

    let mut chunks = Vec::new();
    let mut sink = |stream: StreamKind, chunk: &[u8]| chunks.push((stream, chunk.to_vec()));
    runner
        .execute(
            "require 'vendor/pkg:^1.0'",
            &["--dev"],
            Some(&mut sink),
            Duration::from_secs(10),
        )
        .unwrap();

    assert_eq!(
        stdout_of(&chunks),
        "<require>\n<vendor/pkg:^1.0>\n<--dev>\n<--no-interaction>\n"
    );
}

#[test]
fn test_drop_removes_installation() {
    let env = Env::new();
    let dir = {
        let mut runner = env.runner(ScriptSource::default());
        runner.find_composer().unwrap();
        runner.installation_dir().unwrap().to_path_buf()
    };
    assert!(!dir.exists());
    assert_eq!(env.temp_entries(), 0);
}
