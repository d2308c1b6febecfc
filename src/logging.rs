//! Logging setup for the command-line tool.
//!
//! Everything the library reports goes through `tracing`. The binary installs
//! a subscriber that prints to stderr and appends a plain-text copy to the
//! log file inside the organized folder.

use crate::config::LOG_FILE_NAME;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Default filter when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "info,organize_downloads=debug"
        } else {
            "info"
        })
    })
}

/// Path of the log file for a folder.
pub fn log_file_path(base_path: &Path) -> PathBuf {
    base_path.join(LOG_FILE_NAME)
}

/// Installs the global subscriber.
///
/// If the log file cannot be opened, logging continues on the console only
/// and a warning is printed.
pub fn init_logging(base_path: &Path, verbose: bool) {
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let log_file = log_file_path(base_path);
    let file_layer = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!(
                "Warning: Failed to open log file {}: {}",
                log_file.display(),
                e
            );
            None
        }
    };

    let result = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(console)
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: Logging already initialized: {}", e);
    }
}
