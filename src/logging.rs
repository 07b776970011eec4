//! Tracing setup.
//!
//! The terminal belongs to the TUI, so events go to a log file in the data directory.
//! The filter comes from `TODO_LOG` (e.g. `TODO_LOG=todo=debug`), defaulting to `info`,
//! or `debug` with `--verbose`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

pub const LOG_FILE: &str = "todo.log";
pub const LOG_ENV: &str = "TODO_LOG";

/// Log file location inside a data directory.
pub fn log_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Install the global subscriber, appending to `log_path`.
pub fn init_tracing(log_path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
