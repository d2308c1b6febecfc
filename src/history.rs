/// Persistent move history backing the undo command.
///
/// The history lives in a single JSON file inside the organized folder:
///
/// ```json
/// { "operations": [ { "timestamp": "...", "operations": [ { "timestamp": "...",
///   "source": "...", "destination": "...", "filename": "..." } ] } ] }
/// ```
///
/// Each top-level entry is one organizing session. Only the most recent
/// [`MAX_SESSIONS`] are kept.
use crate::config::HISTORY_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Upper bound on stored sessions; older ones are evicted first.
pub const MAX_SESSIONS: usize = 100;

/// One file moved during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Timestamp of the session this move belongs to.
    pub timestamp: String,
    /// Absolute path the file was moved from.
    pub source: PathBuf,
    /// Absolute path the file was moved to.
    pub destination: PathBuf,
    /// File name at the time of the move.
    pub filename: String,
}

/// All moves of one organizing run, undone as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub timestamp: String,
    #[serde(default)]
    pub operations: Vec<MoveRecord>,
}

impl Session {
    /// Starts an empty session stamped with the current local time.
    pub fn new() -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            operations: Vec::new(),
        }
    }

    /// Records a completed move under this session's timestamp.
    pub fn record(&mut self, source: PathBuf, destination: PathBuf, filename: String) {
        self.operations.push(MoveRecord {
            timestamp: self.timestamp.clone(),
            source,
            destination,
            filename,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk layout of the history file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(default)]
    pub operations: Vec<Session>,
}

impl HistoryLog {
    /// Appends a session and evicts the oldest ones beyond [`MAX_SESSIONS`].
    pub fn push(&mut self, session: Session) {
        self.operations.push(session);
        if self.operations.len() > MAX_SESSIONS {
            let excess = self.operations.len() - MAX_SESSIONS;
            self.operations.drain(..excess);
        }
    }
}

/// Errors that can occur while reading or writing the history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to read history file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write history file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid history file format in {}: {source}", .path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Reads and writes the history file of one folder.
///
/// Every call is a plain read-modify-write; nothing guards against two
/// processes touching the same file at once.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// History store for the folder being organized.
    pub fn for_folder(base_path: &Path) -> Self {
        Self::at(base_path.join(HISTORY_FILE_NAME))
    }

    /// History store backed by an explicit file.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole log. A missing file is an empty log.
    pub fn load(&self) -> HistoryResult<HistoryLog> {
        if !self.path.exists() {
            return Ok(HistoryLog::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| HistoryError::Read {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(HistoryLog::default());
        }

        serde_json::from_str(&content).map_err(|source| HistoryError::InvalidFormat {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrites the file with `log`.
    pub fn save(&self, log: &HistoryLog) -> HistoryResult<()> {
        let json = serde_json::to_string_pretty(log).map_err(|e| HistoryError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        fs::write(&self.path, json).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Adds a session to the end of the log.
    ///
    /// An unreadable or corrupt log is replaced by a fresh one holding only
    /// this session.
    pub fn append(&self, session: Session) -> HistoryResult<()> {
        let mut log = self.load().unwrap_or_else(|e| {
            warn!("Starting a new history: {}", e);
            HistoryLog::default()
        });

        log.push(session);
        self.save(&log)
    }

    /// Removes and returns the most recent session.
    ///
    /// The shortened log is written back before returning, so a crash while
    /// restoring files can never replay the same session twice. `Ok(None)`
    /// means there is nothing to undo.
    pub fn pop_last(&self) -> HistoryResult<Option<Session>> {
        let mut log = self.load()?;
        let Some(session) = log.operations.pop() else {
            return Ok(None);
        };

        self.save(&log)?;
        Ok(Some(session))
    }
}
