//! Log sink for the binary.
//!
//! stdout carries the JSON response only, so logs go to stderr or to a file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "case_search=info";

/// Keeps the file writer alive; buffered lines are flushed on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// A log file that cannot be opened falls back to stderr with a warning.
/// Calling twice is harmless; the second subscriber is discarded.
pub fn init_logging(log_file: Option<&Path>) -> LogGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let Some(path) = log_file else {
        init_stderr(filter);
        return LogGuard { _file: None };
    };

    match open_log_file(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = tracing_subscriber::fmt()
                .with_writer(writer)
                .with_env_filter(filter)
                .with_ansi(false)
                .try_init();
            LogGuard { _file: Some(guard) }
        }
        Err(err) => {
            init_stderr(filter);
            warn!(path = %path.display(), error = %format!("{err:#}"), "log file unavailable; logging to stderr");
            LogGuard { _file: None }
        }
    }
}

fn init_stderr(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
