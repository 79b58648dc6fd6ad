//! Tracing setup. Stdout belongs to the dashboard, so logs go to a file.

use crate::dash_paths;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `cborg_dash=debug`.
pub const LOG_FILTER_ENV: &str = "CBORG_DASH_LOG";

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn open_log_file() -> Result<(std::fs::File, PathBuf)> {
    dash_paths::create_private_dir(&dash_paths::logs_dir()?)?;
    let path = dash_paths::log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok((file, path))
}

/// Installs the global subscriber.
///
/// Falls back to warnings on stderr when the log file cannot be opened.
pub fn init(verbose: bool) {
    match open_log_file() {
        Ok((file, path)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .init();
            tracing::debug!(path = %path.display(), "Logging to file");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            tracing::warn!(error = %format!("{:#}", e), "File logging unavailable");
        }
    }
}
