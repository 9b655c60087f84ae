//! Logging setup for the composer-runner binary
//!
//! Diagnostics go to stderr so that Composer's own stdout is passed through
//! untouched.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `composer_runner` crates log at info
/// (debug when `verbose`) and everything else at warn (info when `verbose`).
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "composer_runner=debug,composer_runner_process=debug,composer_runner_locate=debug,composer_runner_install=debug,composer_runner_config=debug,info"
    } else {
        "composer_runner=info,composer_runner_process=info,composer_runner_locate=info,composer_runner_install=info,composer_runner_config=info,warn"
    }
}
