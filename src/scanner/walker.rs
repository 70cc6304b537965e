//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for listing the files under a
//! scan root and snapshotting their size and timestamp.
//!
//! # Features
//!
//! - Non-recursive (direct children only) or recursive traversal
//! - Entries sorted by file name within each directory
//! - Configurable symlink following
//! - Per-file metadata errors yielded, not swallowed
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use namedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let outcome = walker.scan();
//! println!("{} files, {} errors", outcome.entries.len(), outcome.errors.len());
//! ```

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Files found by a walk plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files with a usable metadata snapshot, in walk order
    pub entries: Vec<FileEntry>,
    /// Files or directories that were skipped, with the reason
    pub errors: Vec<ScanError>,
    /// Whether the walk stopped early on a shutdown request
    pub interrupted: bool,
}

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Only regular files are yielded.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let mut walk_dir = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return None;
                    }

                    // With follow_links on, walkdir reports the target's type.
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }

                    let path = entry.path().to_path_buf();
                    match entry.metadata() {
                        Ok(metadata) => self.process_file_entry(path, &metadata),
                        Err(e) => Some(Err(self.handle_walk_error(e))),
                    }
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Walk to completion, separating entries from errors.
    #[must_use]
    pub fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for result in self.walk() {
            match result {
                Ok(entry) => outcome.entries.push(entry),
                Err(e) => outcome.errors.push(e),
            }
        }

        outcome.interrupted = self.is_shutdown_requested();
        log::debug!(
            "Walk of {} finished: {} files, {} errors",
            self.root.display(),
            outcome.entries.len(),
            outcome.errors.len()
        );
        outcome
    }

    /// Snapshot a file's size and timestamp.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
    ) -> Option<Result<FileEntry, ScanError>> {
        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        if path.file_name().and_then(|n| n.to_str()).is_none() {
            log::warn!("Skipping file with a non-UTF-8 name: {}", path.display());
            return Some(Err(ScanError::InvalidName(path)));
        }

        match self.config.time_source.read(metadata) {
            Ok(timestamp) => Some(Ok(FileEntry::new(path, metadata.len(), timestamp))),
            Err(source) => {
                log::warn!("No {} time for {}: {}", self.config.time_source, path.display(), source);
                Some(Err(ScanError::Metadata { path, source }))
            }
        }
    }

    /// Convert a walkdir error, logging it.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                ScanError::Io {
                    path,
                    source: std::io::Error::other(error.to_string()),
                }
            }
        }
    }
}
