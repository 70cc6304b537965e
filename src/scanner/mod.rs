//! Scanner module for directory traversal and metadata snapshots.
//!
//! This module provides functionality for:
//! - Listing files in a directory, optionally recursively, using walkdir
//! - Taking a timestamp/size snapshot of every file
//! - Collecting per-file metadata failures instead of dropping them
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`path_utils`]: Root validation and display helpers
//!
//! # Example
//!
//! ```no_run
//! use namedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     recursive: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod path_utils;
pub mod walker;

use std::borrow::Cow;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use path_utils::validate_root;
pub use walker::{ScanOutcome, Walker};

/// Snapshot of a discovered file.
///
/// Taken once during the scan and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation or modification time, per [`TimeSource`]
    pub timestamp: SystemTime,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, timestamp: SystemTime) -> Self {
        Self {
            path,
            size,
            timestamp,
        }
    }

    /// The final path component, lossily converted to UTF-8 for display.
    ///
    /// Use [`FileEntry::utf8_name`] for anything that compares names.
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }

    /// The final path component, or `None` if it is not valid UTF-8.
    #[must_use]
    pub fn utf8_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// The directory containing this file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Which timestamp decides the survivor of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
    /// Creation time, falling back to modification time where the platform
    /// does not record it
    #[default]
    Created,
    /// Last modification time
    Modified,
}

impl TimeSource {
    /// Read the configured timestamp from file metadata.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if no usable timestamp exists.
    pub fn read(self, metadata: &Metadata) -> io::Result<SystemTime> {
        match self {
            Self::Modified => metadata.modified(),
            Self::Created => match metadata.created() {
                Ok(created) => Ok(created),
                Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                    log::debug!("Creation time unsupported, using modification time");
                    metadata.modified()
                }
                Err(e) => Err(e),
            },
        }
    }
}

impl std::fmt::Display for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into subdirectories.
    pub recursive: bool,

    /// Follow symbolic links during traversal.
    /// Symlinked files are skipped entirely when this is off.
    pub follow_symlinks: bool,

    /// Timestamp recorded for each file.
    pub time_source: TimeSource,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(recursive: bool, follow_symlinks: bool, time_source: TimeSource) -> Self {
        Self {
            recursive,
            follow_symlinks,
            time_source,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// File metadata (size or timestamp) could not be read.
    #[error("Cannot read metadata for {path}: {source}")]
    Metadata {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file name is not valid UTF-8, so no group key can be derived.
    #[error("File name is not valid UTF-8: {0}")]
    InvalidName(PathBuf),

    /// An I/O error occurred while listing a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::InvalidName(p) => p,
            Self::Metadata { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let now = SystemTime::now();
        let entry = FileEntry::new(PathBuf::from("/test/file.txt"), 1024, now);

        assert_eq!(entry.path, PathBuf::from("/test/file.txt"));
        assert_eq!(entry.size, 1024);
        assert_eq!(entry.timestamp, now);
        assert_eq!(entry.file_name(), "file.txt");
        assert_eq!(entry.directory(), Path::new("/test"));
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.recursive);
        assert!(!config.follow_symlinks);
        assert_eq!(config.time_source, TimeSource::Created);
    }

    #[test]
    fn test_time_source_modified_reads_mtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"x").unwrap();
        let metadata = std::fs::metadata(&path).unwrap();

        assert_eq!(
            TimeSource::Modified.read(&metadata).unwrap(),
            metadata.modified().unwrap()
        );
        assert!(TimeSource::Created.read(&metadata).is_ok());
    }

    #[test]
    fn test_time_source_display() {
        assert_eq!(TimeSource::Created.to_string(), "created");
        assert_eq!(TimeSource::Modified.to_string(), "modified");
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
        assert_eq!(err.path(), Path::new("/file.txt"));
    }
}
