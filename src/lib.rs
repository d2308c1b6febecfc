//! organize-downloads - Tidy a Downloads folder into category subfolders
//!
//! This library classifies the files of a flat folder by extension, moves them
//! into per-category (and optionally per-month) subfolders, records every run
//! in a capped history file, and can reverse the most recent run.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod history;
pub mod logging;
pub mod platform;
pub mod undo;

pub use config::{ConfigError, load_category_table};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizeOptions, OrganizeReport};
pub use history::{HistoryError, HistoryStore, MoveRecord, Session};
pub use undo::{UndoManager, UndoOutcome, UndoReport};

pub use cli::{CliError, CliOutcome, OrganizeCommand, run_cli, run_cli_with_config};
