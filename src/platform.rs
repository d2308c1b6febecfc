//! Platform-dependent collaborators: hidden file detection and the default
//! Downloads location.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Decides whether a file counts as hidden on the current platform.
pub trait PlatformFileAttributes {
    fn is_hidden(&self, path: &Path, metadata: &Metadata) -> bool;
}

/// Hidden means the file name starts with a dot.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotPrefixAttributes;

impl PlatformFileAttributes for DotPrefixAttributes {
    fn is_hidden(&self, path: &Path, _metadata: &Metadata) -> bool {
        has_dot_prefix(path)
    }
}

/// Dot-prefixed names plus anything carrying `FILE_ATTRIBUTE_HIDDEN`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsAttributes;

#[cfg(windows)]
impl PlatformFileAttributes for WindowsAttributes {
    fn is_hidden(&self, path: &Path, metadata: &Metadata) -> bool {
        use std::os::windows::fs::MetadataExt;

        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        has_dot_prefix(path) || metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
    }
}

/// Returns the hidden-file check for the platform we were built for.
pub fn default_attributes() -> Box<dyn PlatformFileAttributes> {
    #[cfg(windows)]
    {
        Box::new(WindowsAttributes)
    }
    #[cfg(not(windows))]
    {
        Box::new(DotPrefixAttributes)
    }
}

fn has_dot_prefix(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// The user's Downloads folder, or `None` if no home directory is known.
pub fn default_downloads_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}
