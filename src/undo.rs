/// Undo functionality for reverting file organization.
///
/// Undo pops the most recent session off the folder's history and moves each
/// of its files back, last moved first. Problems with individual files are
/// reported but never stop the remaining restores.
use crate::file_organizer::move_file;
use crate::history::{HistoryError, HistoryStore, MoveRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Represents the result of restoring one session.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Timestamp of the session that was undone.
    pub session_timestamp: String,
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that could not be restored, with the reason.
    pub errors: Vec<(PathBuf, String)>,
}

impl UndoReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if every record was restored.
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What an undo request amounted to.
#[derive(Debug)]
pub enum UndoOutcome {
    /// The history was absent or empty.
    NothingToUndo,
    /// A session was popped and replayed in reverse.
    Completed(UndoReport),
}

/// Manages undo operations for file organization.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent organizing session of `base_path`.
    ///
    /// The session is removed from the history before any file is touched,
    /// so it is never undone twice even if this run is interrupted.
    ///
    /// # Errors
    ///
    /// Fails only if the history file exists but cannot be read, parsed or
    /// rewritten. In that case no file is moved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use organize_downloads::undo::{UndoManager, UndoOutcome};
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/home/me/Downloads")) {
    ///     Ok(UndoOutcome::Completed(report)) => println!("Restored {} files", report.restored_files),
    ///     Ok(UndoOutcome::NothingToUndo) => println!("Nothing to undo"),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(base_path: &Path) -> Result<UndoOutcome, HistoryError> {
        Self::undo_with_store(&HistoryStore::for_folder(base_path))
    }

    /// Same as [`UndoManager::undo`] against an explicit history store.
    pub fn undo_with_store(store: &HistoryStore) -> Result<UndoOutcome, HistoryError> {
        let Some(session) = store.pop_last()? else {
            info!("No operations in history. Nothing to undo.");
            return Ok(UndoOutcome::NothingToUndo);
        };

        info!("Undoing operation from: {}", session.timestamp);
        info!(
            "Moving {} files back to original location...",
            session.operations.len()
        );

        let mut report = UndoReport {
            session_timestamp: session.timestamp.clone(),
            ..UndoReport::default()
        };

        // Undo is LIFO
        for record in session.operations.iter().rev() {
            match Self::restore_file(record) {
                Ok(()) => {
                    info!("Restored: {}", record.filename);
                    report.restored_files += 1;
                }
                Err(reason) => {
                    report.errors.push((record.destination.clone(), reason));
                }
            }
        }

        info!(
            "Undo complete: {} files restored, {} errors",
            report.restored_files,
            report.error_count()
        );

        Ok(UndoOutcome::Completed(report))
    }

    /// Moves one file back to where it came from.
    ///
    /// A file now sitting at the original location is renamed to a `.bak`
    /// name first so it is not overwritten.
    fn restore_file(record: &MoveRecord) -> Result<(), String> {
        if !record.destination.exists() {
            warn!("File not found, skipping: {}", record.filename);
            return Err("File not found at expected location".to_string());
        }

        if record.source.exists() {
            let backup_path = Self::generate_backup_path(&record.source);
            fs::rename(&record.source, &backup_path).map_err(|e| {
                error!("Error restoring {}: {}", record.filename, e);
                format!("Could not backup conflicting file: {}", e)
            })?;
            warn!(
                "Original location of {} was occupied; kept the other file as {}",
                record.filename,
                backup_path.display()
            );
        }

        move_file(&record.destination, &record.source).map_err(|e| {
            error!("Error restoring {}: {}", record.filename, e);
            format!("Failed to restore file: {}", e)
        })
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        original_path.with_file_name(format!("{}.bak.{}", filename, timestamp))
    }
}
