/// Planning and executing the organization of one folder.
///
/// [`FileOrganizer::run`] walks the direct children of a folder, classifies
/// each regular file by extension, works out a collision-free destination
/// inside `<folder>/<Category>` (or `<folder>/<Category>/<Year>/<Month>`), and
/// either reports the move (dry run) or performs it and records it in the
/// undo history.
use crate::config::reserved_file_names;
use crate::file_category::{CategoryTable, dotted_extension};
use crate::history::{HistoryStore, Session};
use crate::platform::{PlatformFileAttributes, default_attributes};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Probes tried by [`resolve_collision`] before giving up on a file.
pub const MAX_COLLISION_SUFFIX: u32 = 10_000;

const SEPARATOR: &str = "------------------------------------------------------------";

/// Errors that can occur during file organization.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The base directory path cannot be made absolute.
    #[error("Invalid base path {}: {reason}", .path.display())]
    InvalidBasePath { path: PathBuf, reason: String },
    /// The base directory is missing, not a directory, or unreadable.
    #[error("Cannot read directory {}: {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to read a file's metadata.
    #[error("Failed to read metadata of {}: {source}", .path.display())]
    MetadataFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to move a file to its destination.
    #[error("Failed to move {} to {}: {error}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },
    /// Every numbered variant of a file name is already taken.
    #[error("No free name for {filename} in {} after {} attempts", .folder.display(), MAX_COLLISION_SUFFIX)]
    NoFreeName { folder: PathBuf, filename: String },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Flags for one organizing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Report moves without touching the filesystem or the history.
    pub dry_run: bool,
    /// Bucket files into `<Year>/<Month>` below their category folder.
    pub by_date: bool,
}

/// A move that was performed, or would be in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
}

/// Outcome of an organizing run.
#[derive(Debug, Clone, Default)]
pub struct OrganizeReport {
    /// Files moved (or planned) per category, sorted by name.
    pub category_counts: BTreeMap<String, usize>,
    /// Files left in place: hidden, reserved, unclassified, or failed.
    pub skipped: usize,
    /// Every move in processing order.
    pub moves: Vec<PlannedMove>,
    pub dry_run: bool,
    /// Whether a history session was written for this run.
    pub history_saved: bool,
}

impl OrganizeReport {
    /// Total files moved (or planned) across all categories.
    pub fn total_processed(&self) -> usize {
        self.category_counts.values().sum()
    }

    /// Writes the end-of-run summary to the log.
    pub fn log_summary(&self) {
        info!("{}", SEPARATOR);
        info!("SUMMARY:");
        info!("Total files processed: {}", self.total_processed());
        for (category, count) in &self.category_counts {
            info!(
                "  {}: {} {}",
                category,
                count,
                if *count == 1 { "file" } else { "files" }
            );
        }
        info!("Files skipped: {}", self.skipped);

        if self.dry_run {
            info!("This was a dry run. No files were actually moved.");
        }
    }
}

/// What happened to a single directory entry.
enum FileOutcome {
    Skipped,
    Moved(PlannedMove),
}

/// Organizes the files of a folder into category subdirectories.
pub struct FileOrganizer {
    categories: CategoryTable,
    attributes: Box<dyn PlatformFileAttributes>,
    reserved_names: Vec<String>,
}

impl FileOrganizer {
    /// Creates an organizer with the platform's hidden-file check and the
    /// standard reserved file names.
    pub fn new(categories: CategoryTable) -> Self {
        Self {
            categories,
            attributes: default_attributes(),
            reserved_names: reserved_file_names(),
        }
    }

    /// Replaces the hidden-file check.
    pub fn with_attributes(mut self, attributes: Box<dyn PlatformFileAttributes>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replaces the list of file names that are never touched.
    pub fn with_reserved_names(mut self, names: Vec<String>) -> Self {
        self.reserved_names = names;
        self
    }

    /// Organizes the direct children of `base_path`.
    ///
    /// Per-file problems are logged and counted as skipped; only a
    /// `base_path` that cannot be listed aborts the run. After a real run that moved
    /// at least one file, the session is appended to the folder's history.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use organize_downloads::file_category::CategoryTable;
    /// use organize_downloads::file_organizer::{FileOrganizer, OrganizeOptions};
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::new(CategoryTable::default());
    /// let options = OrganizeOptions { dry_run: true, by_date: false };
    /// match organizer.run(Path::new("/home/me/Downloads"), options) {
    ///     Ok(report) => println!("{} files would move", report.total_processed()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn run(
        &self,
        base_path: &Path,
        options: OrganizeOptions,
    ) -> OrganizeResult<OrganizeReport> {
        let base_path = absolute_base_path(base_path)?;

        info!("Starting organization of: {}", base_path.display());
        info!("Dry run mode: {}", options.dry_run);
        if options.by_date {
            info!("Date-based organization: enabled");
        }
        info!("{}", SEPARATOR);

        let entries = fs::read_dir(&base_path).map_err(|source| OrganizeError::ReadDirFailed {
            path: base_path.clone(),
            source,
        })?;

        let mut report = OrganizeReport {
            dry_run: options.dry_run,
            ..OrganizeReport::default()
        };

        // Collect up front so files moved into subfolders are never revisited.
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => files.push(entry.path()),
                Err(e) => {
                    warn!("Could not read directory entry: {}", e);
                    report.skipped += 1;
                }
            }
        }

        let mut session = Session::new();

        for path in files {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping {}: {}", file_name_of(&path), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            match self.process_file(&base_path, &path, &metadata, options) {
                Ok(FileOutcome::Skipped) => report.skipped += 1,
                Ok(FileOutcome::Moved(planned)) => {
                    if !options.dry_run {
                        session.record(
                            planned.source.clone(),
                            planned.destination.clone(),
                            file_name_of(&planned.source),
                        );
                    }
                    *report
                        .category_counts
                        .entry(planned.category.clone())
                        .or_insert(0) += 1;
                    report.moves.push(planned);
                }
                Err(e) => {
                    error!("Error processing {}: {}", file_name_of(&path), e);
                    report.skipped += 1;
                }
            }
        }

        report.log_summary();

        if !options.dry_run && !session.is_empty() {
            match HistoryStore::for_folder(&base_path).append(session) {
                Ok(()) => report.history_saved = true,
                Err(e) => warn!("Could not save history: {}", e),
            }
        }

        Ok(report)
    }

    /// Classifies and moves (or plans) a single regular file.
    fn process_file(
        &self,
        base_path: &Path,
        path: &Path,
        metadata: &fs::Metadata,
        options: OrganizeOptions,
    ) -> OrganizeResult<FileOutcome> {
        let file_name = file_name_of(path);

        if self.attributes.is_hidden(path, metadata) {
            debug!("Skipping hidden/system file: {}", file_name);
            return Ok(FileOutcome::Skipped);
        }

        if self.reserved_names.iter().any(|name| *name == file_name) {
            debug!("Skipping reserved file: {}", file_name);
            return Ok(FileOutcome::Skipped);
        }

        let Some(category) = self.categories.categorize_path(path) else {
            info!(
                "No category for: {} (extension: {})",
                file_name,
                dotted_extension(path)
            );
            return Ok(FileOutcome::Skipped);
        };

        let mut target_folder = base_path.join(category);
        if options.by_date {
            let modified = metadata
                .modified()
                .map_err(|source| OrganizeError::MetadataFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            target_folder = date_folder(&target_folder, modified);
        }

        if !options.dry_run {
            fs::create_dir_all(&target_folder).map_err(|source| {
                OrganizeError::DirectoryCreationFailed {
                    path: target_folder.clone(),
                    source,
                }
            })?;
        }

        let destination = resolve_collision(&target_folder, &file_name)?;
        let relative = destination.strip_prefix(base_path).unwrap_or(&destination);

        if options.dry_run {
            info!("[DRY RUN] Would move: {} → {}", file_name, relative.display());
        } else {
            move_file(path, &destination).map_err(|error| OrganizeError::FileMoveFailure {
                from: path.to_path_buf(),
                to: destination.clone(),
                error,
            })?;
            info!("Moved: {} → {}", file_name, relative.display());
        }

        Ok(FileOutcome::Moved(PlannedMove {
            source: path.to_path_buf(),
            destination,
            category: category.to_string(),
        }))
    }
}

/// Makes `base_path` absolute so history records stay valid from any cwd.
///
/// Existence is checked by the caller (`cli::validate_target`) or surfaces
/// as [`OrganizeError::ReadDirFailed`] when listing the folder.
fn absolute_base_path(base_path: &Path) -> OrganizeResult<PathBuf> {
    std::path::absolute(base_path).map_err(|e| OrganizeError::InvalidBasePath {
        path: base_path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<category_folder>/<Year>/<Month>` for a modification time, in local time.
///
/// ```
/// use organize_downloads::file_organizer::date_folder;
/// use chrono::{Local, TimeZone};
/// use std::path::Path;
///
/// let modified = Local.with_ymd_and_hms(2023, 3, 15, 12, 0, 0).single().unwrap();
/// let folder = date_folder(Path::new("Images"), modified.into());
/// assert_eq!(folder, Path::new("Images/2023/March"));
/// ```
pub fn date_folder(category_folder: &Path, modified: SystemTime) -> PathBuf {
    let modified: DateTime<Local> = modified.into();
    category_folder
        .join(modified.format("%Y").to_string())
        .join(modified.format("%B").to_string())
}

/// Returns a path inside `folder` for `filename` that does not exist yet.
///
/// Tries `filename` first, then `stem_1.ext`, `stem_2.ext`, and so on. The
/// check runs against the filesystem at call time.
pub fn resolve_collision(folder: &Path, filename: &str) -> OrganizeResult<PathBuf> {
    let candidate = folder.join(filename);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = dotted_extension(name);

    for counter in 1..=MAX_COLLISION_SUFFIX {
        let candidate = folder.join(format!("{}_{}{}", stem, counter, extension));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(OrganizeError::NoFreeName {
        folder: folder.to_path_buf(),
        filename: filename.to_string(),
    })
}

/// Moves a file, falling back to copy and delete when a rename is not
/// possible (for example across filesystems).
pub fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    let rename_error = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if !from.is_file() || to.exists() {
        return Err(rename_error);
    }

    if fs::copy(from, to).is_err() {
        let _ = fs::remove_file(to);
        return Err(rename_error);
    }

    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }

    Ok(())
}
