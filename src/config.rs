//! Category configuration and reserved file names.
//!
//! An optional `organize_config.json` inside the target folder can replace the
//! built-in category table:
//!
//! ```json
//! {
//!   "categories": {
//!     "Pictures": [".png", ".jpg"],
//!     "Books": [".epub", ".pdf"]
//!   }
//! }
//! ```
//!
//! Category order in the file is the lookup order. A missing file, a missing
//! or empty `categories` object, or a malformed file all leave the defaults in
//! place; only the malformed case is worth a warning.

use crate::file_category::{Category, CategoryTable};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Log output written by the binary inside the target folder.
pub const LOG_FILE_NAME: &str = "organize.log";
/// Optional category override.
pub const CONFIG_FILE_NAME: &str = "organize_config.json";
/// Undo history.
pub const HISTORY_FILE_NAME: &str = ".organize_history.json";

/// File names the organizer never touches because they hold its own state.
pub fn reserved_file_names() -> Vec<String> {
    [LOG_FILE_NAME, CONFIG_FILE_NAME, HISTORY_FILE_NAME]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Errors that can occur while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    categories: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Resolves which config file applies to a run.
pub fn config_path_for(base_path: &Path, override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_path.join(CONFIG_FILE_NAME))
}

/// Reads a category table from `path`.
///
/// Returns `Ok(None)` when the file does not exist or does not define any
/// categories.
pub fn read_categories(path: &Path) -> Result<Option<CategoryTable>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |source: serde_json::Error| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    };

    let file: ConfigFile = serde_json::from_str(&content).map_err(invalid)?;
    let Some(categories) = file.categories.filter(|map| !map.is_empty()) else {
        return Ok(None);
    };

    let mut table = Vec::with_capacity(categories.len());
    for (name, extensions) in categories {
        let extensions: Vec<String> = serde_json::from_value(extensions).map_err(invalid)?;
        table.push(Category::new(name, extensions));
    }

    Ok(Some(CategoryTable::new(table)))
}

/// Loads the category table for a run, falling back to the defaults.
///
/// This never fails: an unreadable or malformed config is logged as a
/// warning and the built-in table is used instead.
pub fn load_category_table(base_path: &Path, override_path: Option<&Path>) -> CategoryTable {
    let path = config_path_for(base_path, override_path);

    match read_categories(&path) {
        Ok(Some(table)) => {
            info!("Loaded custom categories from {}", path.display());
            table
        }
        Ok(None) => CategoryTable::default(),
        Err(e) => {
            warn!("Could not load config file: {}", e);
            CategoryTable::default()
        }
    }
}
