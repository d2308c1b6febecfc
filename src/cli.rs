//! Command-line interface module.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Target folder validation
//! - Dispatch between organizing and undo

use crate::config::load_category_table;
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeOptions, OrganizeReport};
use crate::history::HistoryError;
use crate::platform::default_downloads_dir;
use crate::undo::{UndoManager, UndoOutcome};
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Organize your Downloads folder automatically.
#[derive(Debug, Parser)]
#[command(
    name = "organize-downloads",
    version,
    about,
    after_help = "Examples:\n  \
        organize-downloads                      Organize the default Downloads folder\n  \
        organize-downloads --dry-run            Preview what would happen\n  \
        organize-downloads --path /custom/path  Organize a custom folder\n  \
        organize-downloads --by-date            Organize into year/month subfolders\n  \
        organize-downloads --undo               Undo the last organization"
)]
pub struct Args {
    /// Custom path to organize (default: system Downloads folder)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Preview changes without actually moving files
    #[arg(long)]
    pub dry_run: bool,

    /// Organize files into year/month subfolders based on modification date
    #[arg(long)]
    pub by_date: bool,

    /// Undo the last organization operation
    #[arg(long)]
    pub undo: bool,

    /// Read categories from this file instead of organize_config.json
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug details, such as skipped hidden files
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The command these flags ask for. Undo wins over organizing.
    pub fn command(&self) -> OrganizeCommand {
        if self.undo {
            OrganizeCommand::Undo
        } else {
            OrganizeCommand::Organize(OrganizeOptions {
                dry_run: self.dry_run,
                by_date: self.by_date,
            })
        }
    }

    /// The folder to work on: `--path`, or the user's Downloads folder.
    pub fn target_folder(&self) -> Result<PathBuf, CliError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_downloads_dir().ok_or(CliError::NoDownloadsFolder),
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize(OrganizeOptions),
    /// Undo the previous organization.
    Undo,
}

/// Errors that stop a CLI invocation.
///
/// Only a bad target folder is a usage error; see [`CliError::is_usage_error`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Could not determine the Downloads folder; use --path")]
    NoDownloadsFolder,
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error("Error during undo: {0}")]
    Undo(#[from] HistoryError),
}

impl CliError {
    /// Whether the process should exit with a failure status.
    ///
    /// Run-time failures such as an unlistable folder or a corrupt history
    /// are logged and still exit zero.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            CliError::PathNotFound(_) | CliError::NotADirectory(_) | CliError::NoDownloadsFolder
        )
    }
}

/// What a successful invocation did.
#[derive(Debug)]
pub enum CliOutcome {
    Organized(OrganizeReport),
    Undone(UndoOutcome),
}

/// Checks that the target folder exists and is a directory.
pub fn validate_target(dir_path: &Path) -> Result<(), CliError> {
    if !dir_path.exists() {
        return Err(CliError::PathNotFound(dir_path.to_path_buf()));
    }
    if !dir_path.is_dir() {
        return Err(CliError::NotADirectory(dir_path.to_path_buf()));
    }
    Ok(())
}

/// Runs a command against a folder using its own config file.
///
/// # Examples
///
/// ```no_run
/// use organize_downloads::cli::{run_cli, OrganizeCommand};
/// use organize_downloads::file_organizer::OrganizeOptions;
/// use std::path::Path;
///
/// let command = OrganizeCommand::Organize(OrganizeOptions::default());
/// match run_cli(command, Path::new("/path/to/directory")) {
///     Ok(_) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<CliOutcome, CliError> {
    run_cli_with_config(command, dir_path, None)
}

/// Runs a command with an optional explicit config file.
///
/// Per-file problems never make this fail; they are logged and show up in
/// the returned report.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<CliOutcome, CliError> {
    validate_target(dir_path)?;

    match command {
        OrganizeCommand::Organize(options) => {
            let categories = load_category_table(dir_path, config_path);
            let report = FileOrganizer::new(categories)
                .run(dir_path, options)
                .inspect_err(|e| error!("{}", e))?;
            Ok(CliOutcome::Organized(report))
        }
        OrganizeCommand::Undo => {
            let outcome = UndoManager::undo(dir_path)
                .inspect_err(|e| error!("Error during undo: {}", e))?;
            Ok(CliOutcome::Undone(outcome))
        }
    }
}
