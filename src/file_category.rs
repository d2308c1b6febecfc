//! Extension-based file categorization.
//!
//! A [`CategoryTable`] is an ordered list of categories, each owning a set of
//! dot-prefixed, lowercase extensions. Lookup walks the table in order and the
//! first category containing the extension wins.
//!
//! # Examples
//!
//! ```
//! use organize_downloads::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.category_for(".png"), Some("Images"));
//! assert_eq!(table.category_for(".PDF"), Some("Documents"));
//! assert_eq!(table.category_for(".xyz"), None);
//! ```

use std::collections::HashSet;
use std::path::Path;

/// Built-in categories, in lookup order.
const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg", ".ico"],
    ),
    (
        "Documents",
        &[
            ".pdf", ".docx", ".xlsx", ".txt", ".pptx", ".doc", ".xls", ".ppt", ".odt", ".csv",
        ],
    ),
    (
        "Videos",
        &[".mp4", ".mkv", ".mov", ".avi", ".flv", ".wmv", ".webm"],
    ),
    (
        "Archives",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
    ),
    (
        "Installers",
        &[".exe", ".msi", ".dmg", ".deb", ".rpm", ".pkg", ".apk"],
    ),
    (
        "Music",
        &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a", ".wma"],
    ),
    (
        "Code",
        &[
            ".py", ".js", ".java", ".cpp", ".c", ".h", ".cs", ".php", ".rb", ".go", ".rs", ".ts",
            ".html", ".css",
        ],
    ),
];

/// A single named category and the extensions that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Folder name the category's files are moved into.
    pub name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category. Extensions are lowercased.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Returns true if this category claims the given (already lowercased) extension.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }
}

/// Ordered mapping from category name to extensions.
///
/// The table is built once per run, either from [`CategoryTable::default`]
/// or from a config file, and is never modified afterwards. A custom table
/// replaces the defaults entirely; the two are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Builds a table from categories in lookup order.
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Returns the category name for a dot-prefixed extension such as `".jpg"`.
    ///
    /// The extension is lowercased before lookup. `None` means the file is
    /// left where it is.
    pub fn category_for(&self, extension: &str) -> Option<&str> {
        if extension.is_empty() {
            return None;
        }

        let extension = extension.to_lowercase();
        self.categories
            .iter()
            .find(|category| category.contains(&extension))
            .map(|category| category.name.as_str())
    }

    /// Classifies a path by its last extension.
    ///
    /// ```
    /// use organize_downloads::file_category::CategoryTable;
    /// use std::path::Path;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.categorize_path(Path::new("backup.tar.gz")), Some("Archives"));
    /// assert_eq!(table.categorize_path(Path::new("README")), None);
    /// ```
    pub fn categorize_path(&self, path: &Path) -> Option<&str> {
        self.category_for(&dotted_extension(path))
    }

    /// Category names in lookup order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORIES
                .iter()
                .map(|(name, extensions)| Category::new(*name, extensions.iter()))
                .collect(),
        )
    }
}

/// Returns the file's extension with a leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
