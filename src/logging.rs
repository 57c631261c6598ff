//! Logging setup for the `ql` binary.
//!
//! Verbosity flags pick the default level; `RUST_LOG` wins when set.
//! Logs go to stderr so stdout stays clean for command output.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given flags.
#[must_use]
pub const fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
