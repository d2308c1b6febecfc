use organize_downloads::cli::{CliError, CliOutcome, OrganizeCommand, run_cli, run_cli_with_config};
use organize_downloads::file_organizer::{OrganizeOptions, OrganizeReport};
use organize_downloads::history::{HistoryStore, MAX_SESSIONS};
use organize_downloads::undo::{UndoOutcome, UndoReport};
/// Integration tests for organize-downloads
///
/// These tests drive the library's CLI entry point against temporary folders
/// and check the resulting directory layout and history file.
///
/// Test categories:
/// 1. Basic organization
/// 2. Collisions
/// 3. Dry-run mode
/// 4. Date-based folders
/// 5. Configuration
/// 6. Undo and history
/// 7. Error scenarios
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

const HISTORY: &str = ".organize_history.json";

/// A temporary folder standing in for a Downloads directory.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    fn create_file_modified_at(&self, name: &str, modified: SystemTime) {
        let path = self.create_file(name, "dated");
        File::options()
            .write(true)
            .open(&path)
            .expect("Failed to open file")
            .set_modified(modified)
            .expect("Failed to set modification time");
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    /// Every file below the folder, relative, excluding the history file.
    fn snapshot(&self) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        Self::walk_dir(self.path(), self.path(), &mut files);
        files.remove(Path::new(HISTORY));
        files
    }

    fn walk_dir(root: &Path, dir: &Path, files: &mut BTreeSet<PathBuf>) {
        for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::walk_dir(root, &path, files);
            } else if let Ok(rel) = path.strip_prefix(root) {
                files.insert(rel.to_path_buf());
            }
        }
    }

    fn history_len(&self) -> usize {
        HistoryStore::for_folder(self.path())
            .load()
            .expect("Failed to load history")
            .operations
            .len()
    }

    fn organize(&self, options: OrganizeOptions) -> OrganizeReport {
        match run_cli(OrganizeCommand::Organize(options), self.path()) {
            Ok(CliOutcome::Organized(report)) => report,
            other => panic!("unexpected organize result: {:?}", other),
        }
    }

    fn organize_real(&self) -> OrganizeReport {
        self.organize(OrganizeOptions::default())
    }

    fn undo(&self) -> UndoOutcome {
        match run_cli(OrganizeCommand::Undo, self.path()) {
            Ok(CliOutcome::Undone(outcome)) => outcome,
            other => panic!("unexpected undo result: {:?}", other),
        }
    }

    fn undo_report(&self) -> UndoReport {
        match self.undo() {
            UndoOutcome::Completed(report) => report,
            UndoOutcome::NothingToUndo => panic!("expected a session to undo"),
        }
    }
}

fn local_time(year: i32, month: u32, day: u32) -> SystemTime {
    use chrono::{Local, TimeZone};
    Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid local time")
        .into()
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    let report = fixture.organize_real();

    assert_eq!(report.total_processed(), 0);
    assert_eq!(report.skipped, 0);
    fixture.assert_file_not_exists(HISTORY);
}

#[test]
fn test_organize_mixed_folder() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");
    fixture.create_file("b.txt", "text");
    fixture.create_file("note", "no extension");

    let report = fixture.organize_real();

    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Documents/b.txt");
    fixture.assert_file_exists("note");
    fixture.assert_file_not_exists("a.jpg");
    fixture.assert_file_not_exists("b.txt");

    assert_eq!(report.skipped, 1);
    assert_eq!(report.total_processed(), 2);
    let counts: Vec<_> = report
        .category_counts
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    // Sorted by category name
    assert_eq!(counts, vec![("Documents", 1), ("Images", 1)]);
}

#[test]
fn test_organize_all_default_categories() {
    let fixture = TestFixture::new();
    let files = [
        ("photo.PNG", "Images"),
        ("report.pdf", "Documents"),
        ("clip.mkv", "Videos"),
        ("backup.tar.gz", "Archives"),
        ("setup.exe", "Installers"),
        ("song.mp3", "Music"),
        ("main.rs", "Code"),
    ];
    for (name, _) in &files {
        fixture.create_file(name, "content");
    }

    let report = fixture.organize_real();

    assert_eq!(report.total_processed(), files.len());
    for (name, category) in &files {
        fixture.assert_file_exists(&format!("{}/{}", category, name));
        fixture.assert_file_not_exists(name);
    }
}

#[test]
fn test_organize_preserves_file_content() {
    let fixture = TestFixture::new();
    fixture.create_file("report.pdf", "%PDF-1.4 body");

    fixture.organize_real();

    assert_eq!(fixture.read("Documents/report.pdf"), "%PDF-1.4 body");
}

#[test]
fn test_organize_skips_hidden_and_reserved_files() {
    let fixture = TestFixture::new();
    fixture.create_file(".secret.jpg", "hidden");
    fixture.create_file("organize.log", "log");
    fixture.create_file("organize_config.json", "{ broken");
    fixture.create_file("movie.mp4", "video");

    let report = fixture.organize_real();

    fixture.assert_file_exists(".secret.jpg");
    fixture.assert_file_exists("organize.log");
    fixture.assert_file_exists("organize_config.json");
    fixture.assert_file_exists("Videos/movie.mp4");
    assert_eq!(report.skipped, 3);
}

#[test]
fn test_organize_leaves_subdirectories_alone() {
    let fixture = TestFixture::new();
    fixture.create_file("nested/inner.jpg", "image");
    fixture.create_file("top.jpg", "image");

    fixture.organize_real();

    fixture.assert_file_exists("nested/inner.jpg");
    fixture.assert_file_exists("Images/top.jpg");
    fixture.assert_file_not_exists("Images/inner.jpg");
}

#[test]
fn test_organize_again_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");
    fixture.create_file("readme", "text");

    fixture.organize_real();
    let after_first = fixture.snapshot();

    let report = fixture.organize_real();

    assert_eq!(fixture.snapshot(), after_first);
    assert_eq!(report.total_processed(), 0);
    // Only the first run moved anything
    assert_eq!(fixture.history_len(), 1);
}

// ============================================================================
// Test Suite 2: Collisions
// ============================================================================

#[test]
fn test_collision_with_existing_file() {
    let fixture = TestFixture::new();
    fixture.create_file("Images/photo.png", "old");
    fixture.create_file("photo.png", "new");

    let report = fixture.organize_real();

    assert_eq!(fixture.read("Images/photo.png"), "old");
    assert_eq!(fixture.read("Images/photo_1.png"), "new");
    assert_eq!(
        report.moves[0].destination,
        fixture.path().join("Images").join("photo_1.png")
    );
}

#[test]
fn test_collision_suffixes_are_sequential() {
    let fixture = TestFixture::new();
    fixture.create_file("Documents/notes.txt", "v0");
    fixture.create_file("Documents/notes_1.txt", "v1");
    fixture.create_file("notes.txt", "v2");

    fixture.organize_real();

    fixture.assert_file_exists("Documents/notes_2.txt");
    assert_eq!(fixture.read("Documents/notes_2.txt"), "v2");
    assert_eq!(fixture.read("Documents/notes_1.txt"), "v1");
}

#[test]
fn test_collision_across_runs() {
    let fixture = TestFixture::new();
    fixture.create_file("song.mp3", "first");
    fixture.organize_real();

    fixture.create_file("song.mp3", "second");
    fixture.organize_real();

    assert_eq!(fixture.read("Music/song.mp3"), "first");
    assert_eq!(fixture.read("Music/song_1.mp3"), "second");
}

// ============================================================================
// Test Suite 3: Dry-Run Mode
// ============================================================================

#[test]
fn test_dry_run_doesnt_touch_anything() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.png", "image");
    fixture.create_file("report.pdf", "doc");
    fixture.create_file("mystery.xyz", "unknown");
    let before = fixture.snapshot();

    let report = fixture.organize(OrganizeOptions {
        dry_run: true,
        by_date: true,
    });

    assert_eq!(fixture.snapshot(), before);
    fixture.assert_file_not_exists(HISTORY);
    assert!(report.dry_run);
    assert!(!report.history_saved);
    assert_eq!(report.total_processed(), 2);
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_dry_run_reports_collision_free_destinations() {
    let fixture = TestFixture::new();
    fixture.create_file("Images/photo.png", "old");
    fixture.create_file("photo.png", "new");

    let report = fixture.organize(OrganizeOptions {
        dry_run: true,
        by_date: false,
    });

    assert_eq!(report.moves.len(), 1);
    assert_eq!(
        report.moves[0].destination,
        fixture.path().join("Images").join("photo_1.png")
    );
    fixture.assert_file_exists("photo.png");
    fixture.assert_file_not_exists("Images/photo_1.png");
}

#[test]
fn test_dry_run_then_real_run() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");

    fixture.organize(OrganizeOptions {
        dry_run: true,
        by_date: false,
    });
    fixture.assert_file_exists("a.jpg");

    fixture.organize_real();
    fixture.assert_file_exists("Images/a.jpg");
    assert_eq!(fixture.history_len(), 1);
}

// ============================================================================
// Test Suite 4: Date-Based Folders
// ============================================================================

#[test]
fn test_by_date_uses_modification_time() {
    let fixture = TestFixture::new();
    fixture.create_file_modified_at("holiday.jpg", local_time(2023, 3, 15));
    fixture.create_file_modified_at("taxes.pdf", local_time(2021, 11, 2));

    fixture.organize(OrganizeOptions {
        dry_run: false,
        by_date: true,
    });

    fixture.assert_file_exists("Images/2023/March/holiday.jpg");
    fixture.assert_file_exists("Documents/2021/November/taxes.pdf");
}

#[test]
fn test_by_date_collision() {
    let fixture = TestFixture::new();
    fixture.create_file("Images/2022/July/pic.gif", "old");
    fixture.create_file_modified_at("pic.gif", local_time(2022, 7, 4));

    fixture.organize(OrganizeOptions {
        dry_run: false,
        by_date: true,
    });

    fixture.assert_file_exists("Images/2022/July/pic_1.gif");
}

// ============================================================================
// Test Suite 5: Configuration
// ============================================================================

#[test]
fn test_config_file_replaces_default_categories() {
    let fixture = TestFixture::new();
    fixture.create_file(
        "organize_config.json",
        r#"{"categories": {"Books": [".epub", ".PDF"]}}"#,
    );
    fixture.create_file("novel.epub", "book");
    fixture.create_file("paper.pdf", "paper");
    fixture.create_file("photo.jpg", "image");

    let report = fixture.organize_real();

    fixture.assert_file_exists("Books/novel.epub");
    fixture.assert_file_exists("Books/paper.pdf");
    // Defaults are not merged in
    fixture.assert_file_exists("photo.jpg");
    fixture.assert_file_exists("organize_config.json");
    assert_eq!(report.skipped, 2);
}

#[test]
fn test_malformed_config_uses_defaults() {
    let fixture = TestFixture::new();
    fixture.create_file("organize_config.json", "{ this is not json");
    fixture.create_file("photo.jpg", "image");

    fixture.organize_real();

    fixture.assert_file_exists("Images/photo.jpg");
}

#[test]
fn test_explicit_config_path() {
    let fixture = TestFixture::new();
    let elsewhere = TempDir::new().expect("Failed to create temp directory");
    let config = elsewhere.path().join("categories.json");
    fs::write(&config, r#"{"categories": {"Sheets": [".csv"]}}"#).expect("write failed");
    fixture.create_file("data.csv", "a,b");

    let result = run_cli_with_config(
        OrganizeCommand::Organize(OrganizeOptions::default()),
        fixture.path(),
        Some(&config),
    );

    assert!(result.is_ok());
    fixture.assert_file_exists("Sheets/data.csv");
}

// ============================================================================
// Test Suite 6: Undo and History
// ============================================================================

#[test]
fn test_undo_restores_original_layout() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "1");
    fixture.create_file("b.txt", "2");
    fixture.create_file("c.zip", "3");
    fixture.create_file("d.mp3", "4");
    fixture.create_file("unknown.xyz", "5");
    let before = fixture.snapshot();

    fixture.organize_real();
    assert_ne!(fixture.snapshot(), before);

    let report = fixture.undo_report();

    assert_eq!(report.restored_files, 4);
    assert!(report.is_complete_success());
    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.read("a.jpg"), "1");
}

#[test]
fn test_undo_only_reverts_latest_session() {
    let fixture = TestFixture::new();
    fixture.create_file("first.jpg", "1");
    fixture.organize_real();

    fixture.create_file("second.txt", "2");
    fixture.organize_real();
    assert_eq!(fixture.history_len(), 2);

    let report = fixture.undo_report();

    assert_eq!(report.restored_files, 1);
    fixture.assert_file_exists("second.txt");
    fixture.assert_file_not_exists("Documents/second.txt");
    fixture.assert_file_exists("Images/first.jpg");
    assert_eq!(fixture.history_len(), 1);
}

#[test]
fn test_undo_without_history() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.png", "image");
    let before = fixture.snapshot();

    let outcome = fixture.undo();

    assert!(matches!(outcome, UndoOutcome::NothingToUndo));
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_undo_with_empty_history_file() {
    let fixture = TestFixture::new();
    fixture.create_file(HISTORY, r#"{"operations": []}"#);

    assert!(matches!(fixture.undo(), UndoOutcome::NothingToUndo));
}

#[test]
fn test_undo_twice_after_one_run() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");
    fixture.organize_real();

    fixture.undo_report();
    assert!(matches!(fixture.undo(), UndoOutcome::NothingToUndo));
    fixture.assert_file_exists("a.jpg");
}

#[test]
fn test_undo_with_file_removed_by_user() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");
    fixture.create_file("b.txt", "text");
    fixture.organize_real();

    fs::remove_file(fixture.path().join("Images/a.jpg")).expect("remove failed");

    let report = fixture.undo_report();

    assert_eq!(report.restored_files, 1);
    assert_eq!(report.error_count(), 1);
    fixture.assert_file_exists("b.txt");
    // The session is consumed regardless of the failure
    assert_eq!(fixture.history_len(), 0);
}

#[test]
fn test_undo_by_date_session() {
    let fixture = TestFixture::new();
    fixture.create_file_modified_at("scan.pdf", local_time(2020, 1, 20));
    fixture.organize(OrganizeOptions {
        dry_run: false,
        by_date: true,
    });
    fixture.assert_file_exists("Documents/2020/January/scan.pdf");

    fixture.undo_report();

    fixture.assert_file_exists("scan.pdf");
}

#[test]
fn test_history_records_absolute_paths() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", "image");
    fixture.organize_real();

    let log = HistoryStore::for_folder(fixture.path())
        .load()
        .expect("Failed to load history");
    let session = &log.operations[0];
    let record = &session.operations[0];

    assert_eq!(record.source, fixture.path().join("a.jpg"));
    assert_eq!(record.destination, fixture.path().join("Images").join("a.jpg"));
    assert_eq!(record.filename, "a.jpg");
    assert_eq!(record.timestamp, session.timestamp);
    assert!(record.source.is_absolute());
}

#[test]
fn test_history_never_exceeds_cap() {
    let fixture = TestFixture::new();

    for i in 0..=MAX_SESSIONS {
        fixture.create_file(&format!("file_{}.txt", i), "x");
        fixture.organize_real();
    }

    assert_eq!(fixture.history_len(), MAX_SESSIONS);

    // The oldest session was evicted, so the last undo restores file_1.
    for _ in 0..MAX_SESSIONS {
        fixture.undo_report();
    }
    fixture.assert_file_exists("file_1.txt");
    fixture.assert_file_exists("Documents/file_0.txt");
    assert!(matches!(fixture.undo(), UndoOutcome::NothingToUndo));
}

// ============================================================================
// Test Suite 7: Error Scenarios
// ============================================================================

#[test]
fn test_missing_target_folder() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("does-not-exist");

    let result = run_cli(OrganizeCommand::Organize(OrganizeOptions::default()), &missing);
    assert!(matches!(result, Err(CliError::PathNotFound(_))));

    let result = run_cli(OrganizeCommand::Undo, &missing);
    assert!(matches!(result, Err(CliError::PathNotFound(_))));
    assert!(result.is_err_and(|e| e.is_usage_error()));
}

#[test]
fn test_target_is_a_file() {
    let fixture = TestFixture::new();
    let file = fixture.create_file("a.txt", "x");

    let result = run_cli(OrganizeCommand::Organize(OrganizeOptions::default()), &file);
    assert!(matches!(result, Err(CliError::NotADirectory(_))));
    assert!(result.is_err_and(|e| e.is_usage_error()));
}

#[test]
fn test_corrupt_history_blocks_undo_but_not_organize() {
    let fixture = TestFixture::new();
    fixture.create_file(HISTORY, "{ corrupt");
    fixture.create_file("a.jpg", "image");

    // Logged as an error, but the process still exits zero
    let result = run_cli(OrganizeCommand::Undo, fixture.path());
    assert!(matches!(result, Err(CliError::Undo(_))));
    assert!(result.is_err_and(|e| !e.is_usage_error()));
    fixture.assert_file_exists("a.jpg");
    assert_eq!(fixture.read(HISTORY), "{ corrupt");

    // Organizing replaces the unreadable history with a fresh one
    fixture.organize_real();
    assert_eq!(fixture.history_len(), 1);
}

#[test]
fn test_failed_move_does_not_stop_the_run() {
    let fixture = TestFixture::new();
    fixture.create_file("Images", "a file where the folder should be");
    fixture.create_file("a.jpg", "image");
    fixture.create_file("b.txt", "text");

    let report = fixture.organize_real();

    fixture.assert_file_exists("a.jpg");
    fixture.assert_file_exists("Documents/b.txt");
    assert_eq!(report.skipped, 2);
    assert_eq!(report.total_processed(), 1);
}

#[test]
fn test_unsaved_history_keeps_moves() {
    let fixture = TestFixture::new();
    fs::create_dir(fixture.path().join(HISTORY)).expect("Failed to create directory");
    fixture.create_file("a.jpg", "image");
    fixture.create_file("b.txt", "text");

    let report = match run_cli(
        OrganizeCommand::Organize(OrganizeOptions::default()),
        fixture.path(),
    ) {
        Ok(CliOutcome::Organized(report)) => report,
        other => panic!("expected an organize report, got {:?}", other),
    };

    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Documents/b.txt");
    assert_eq!(report.total_processed(), 2);
    assert!(!report.history_saved);
}
