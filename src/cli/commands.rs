//! Subcommand handlers
//!
//! Each handler owns its [`ComposerRunner`], so any temporary installation is
//! removed before control returns to [`super::run`].

use anyhow::{Context, Result};
use std::io::Write;

use crate::{ComposerRunner, Config, StreamKind};

/// Run one Composer command, streaming its output to our own stdout/stderr.
pub fn execute_run_command(config: &Config, command: &str, args: &[String]) -> Result<()> {
    let mut runner = ComposerRunner::from_config(config);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut forward = |stream: StreamKind, chunk: &[u8]| {
        // Write errors on our side never interrupt the child
        let _ = match stream {
            StreamKind::Stdout => stdout.lock().write_all(chunk),
            StreamKind::Stderr => stderr.lock().write_all(chunk),
        };
    };

    let outcome = runner.execute(command, args, Some(&mut forward), config.timeout())?;
    tracing::debug!(elapsed_ms = outcome.elapsed.as_millis(), "Run complete");

    runner.cleanup();
    std::io::stdout().flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Print the Composer binary that `run` would use.
///
/// An installed binary is removed again before returning, so its path is
/// informational only.
pub fn execute_find_command(config: &Config, json: bool) -> Result<()> {
    let mut runner = ComposerRunner::from_config(config);
    let resolved = runner.find_composer()?;

    if json {
        let value = serde_json::json!({
            "path": resolved.path.display().to_string(),
            "origin": resolved.origin.as_str(),
        });
        let rendered =
            serde_json::to_string_pretty(&value).context("Failed to serialize result")?;
        println!("{rendered}");
    } else {
        println!("{} ({})", resolved.path.display(), resolved.origin);
    }

    runner.cleanup();
    Ok(())
}

/// Print each effective setting with the source it came from.
pub fn execute_config_command(config: &Config) -> Result<()> {
    match &config.config_path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }
    for (key, (value, source)) in config.effective_config() {
        println!("  {key} = {value} ({source})");
    }
    Ok(())
}
