//! Duplicate finder: scan, then group.
//!
//! # Overview
//!
//! This module orchestrates the pipeline:
//! 1. **Pattern check**: compile the duplicate-marker pattern before touching
//!    the filesystem
//! 2. **Scan**: validate the root and snapshot every file
//!    (see [`crate::scanner`])
//! 3. **Grouping**: group by directory and key, pick survivors
//!    (see [`crate::duplicates::groups`])
//!
//! # Example
//!
//! ```no_run
//! use namedupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//! println!("{} groups, {} files to delete", groups.len(), summary.duplicate_files);
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::groups::{group_by_key, DuplicateGroup};
use super::key::{NameNormalizer, PatternError, DEFAULT_PATTERN};
use crate::scanner::{validate_root, ScanError, Walker, WalkerConfig};

/// Configuration for a duplicate search.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Regex for numeric duplicate markers
    pub pattern: String,
    /// Also strip `.copy` / ` - copy` markers
    pub detect_copy: bool,
    /// Directory walking options
    pub walker: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            detect_copy: false,
            walker: WalkerConfig::default(),
            shutdown_flag: None,
        }
    }
}

impl FinderConfig {
    /// Set the duplicate-marker pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Enable/disable copy-marker detection.
    #[must_use]
    pub fn with_detect_copy(mut self, detect_copy: bool) -> Self {
        self.detect_copy = detect_copy;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

/// Errors that stop a search.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The pattern did not compile; nothing was scanned.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The scan root is unusable.
    #[error("cannot scan directory: {0}")]
    Root(#[source] ScanError),

    /// The user interrupted the scan.
    #[error("scan interrupted by user")]
    Interrupted,
}

/// Summary of a completed search.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Resolved scan root
    pub root: PathBuf,
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of files proposed for deletion
    pub duplicate_files: usize,
    /// Bytes freed by deleting every candidate
    pub reclaimable_space: u64,
    /// Duration of the entire search
    pub scan_duration: Duration,
    /// Files skipped because they could not be read
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any file was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Finds name-based duplicates under a directory.
#[derive(Debug)]
pub struct DuplicateFinder {
    normalizer: NameNormalizer,
    walker: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DuplicateFinder {
    /// Create a finder, compiling the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Pattern`] for a malformed pattern.
    pub fn new(config: FinderConfig) -> Result<Self, FinderError> {
        let normalizer = NameNormalizer::new(&config.pattern, config.detect_copy)?;
        Ok(Self {
            normalizer,
            walker: config.walker,
            shutdown_flag: config.shutdown_flag,
        })
    }

    /// Create a finder with default pattern and walker settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            normalizer: NameNormalizer::default(),
            walker: WalkerConfig::default(),
            shutdown_flag: None,
        }
    }

    /// The normalizer used to derive group keys.
    #[must_use]
    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan `root` and group the files found.
    ///
    /// Unreadable files are listed in [`ScanSummary::scan_errors`] and left
    /// out of grouping.
    ///
    /// # Errors
    ///
    /// - [`FinderError::Root`] if `root` is missing, not a directory, or
    ///   inaccessible
    /// - [`FinderError::Interrupted`] if shutdown was requested
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start = Instant::now();
        let root = validate_root(root).map_err(FinderError::Root)?;

        log::info!(
            "Scanning {} ({}) for names matching '{}'{}",
            root.display(),
            if self.walker.recursive {
                "recursive"
            } else {
                "non-recursive"
            },
            self.normalizer.pattern(),
            if self.normalizer.detects_copies() {
                " and copy markers"
            } else {
                ""
            }
        );

        let mut walker = Walker::new(&root, self.walker.clone());
        if let Some(flag) = &self.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        let outcome = walker.scan();

        if outcome.interrupted || self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let total_files = outcome.entries.len();
        let total_size = outcome.entries.iter().map(|e| e.size).sum();
        let (mut groups, _) = group_by_key(outcome.entries, &self.normalizer);
        if self.walker.follow_symlinks {
            groups = drop_aliases(groups);
        }

        let summary = ScanSummary {
            root,
            total_files,
            total_size,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            reclaimable_space: groups.iter().map(DuplicateGroup::reclaimable_space).sum(),
            scan_duration: start.elapsed(),
            scan_errors: outcome.errors,
        };

        log::info!(
            "Found {} duplicate group(s) among {} file(s)",
            summary.duplicate_groups,
            summary.total_files
        );

        Ok((groups, summary))
    }
}

/// Remove members that resolve to the same file as an earlier member.
///
/// A followed symlink carries its target's timestamp, so either may sort
/// first. Groups left with one member are dropped.
fn drop_aliases(groups: Vec<DuplicateGroup>) -> Vec<DuplicateGroup> {
    groups
        .into_iter()
        .filter_map(|group| {
            let DuplicateGroup {
                key,
                directory,
                files,
            } = group;
            let mut seen = HashSet::new();
            let files: Vec<_> = files
                .into_iter()
                .filter(|file| {
                    let target = fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
                    let first = seen.insert(target);
                    if !first {
                        log::warn!(
                            "{} is the same file as another member of group '{}', leaving it alone",
                            file.path.display(),
                            key
                        );
                    }
                    first
                })
                .collect();
            (files.len() > 1).then(|| DuplicateGroup::new(key, directory, files))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_pattern_rejected_before_scan() {
        let config = FinderConfig::default().with_pattern("([");
        let err = DuplicateFinder::new(config).unwrap_err();
        assert!(matches!(err, FinderError::Pattern(_)));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let finder = DuplicateFinder::with_defaults();
        let err = finder.find_duplicates(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, FinderError::Root(ScanError::NotFound(_))));
    }

    #[test]
    fn test_finds_numbered_copies() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"1").unwrap();
        fs::write(dir.path().join("a (1).txt"), b"22").unwrap();
        fs::write(dir.path().join("b.txt"), b"333").unwrap();

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.total_size, 6);
        assert_eq!(summary.duplicate_files, 1);
        assert!(!summary.has_errors());
    }

    #[test]
    fn test_interrupted_search() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"1").unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        let finder =
            DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag)).unwrap();

        assert!(matches!(
            finder.find_duplicates(dir.path()),
            Err(FinderError::Interrupted)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_followed_symlink_never_costs_its_target() {
        use crate::scanner::TimeSource;
        use filetime::{set_file_mtime, FileTime};

        let dir = TempDir::new().unwrap();
        let real = dir.path().join("a.txt");
        let newer = dir.path().join("a (2).txt");
        fs::write(&real, b"1").unwrap();
        fs::write(&newer, b"2").unwrap();
        set_file_mtime(&real, FileTime::from_unix_time(1_000, 0)).unwrap();
        set_file_mtime(&newer, FileTime::from_unix_time(2_000, 0)).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("a (1).txt")).unwrap();

        let config = FinderConfig::default().with_walker(WalkerConfig::new(
            false,
            true,
            TimeSource::Modified,
        ));
        let (groups, summary) = DuplicateFinder::new(config)
            .unwrap()
            .find_duplicates(dir.path())
            .unwrap();

        // The link ties with its target and sorts first; the target must drop
        // out rather than become a candidate.
        assert_eq!(groups.len(), 1);
        let members: Vec<_> = groups[0].paths();
        assert!(!members.iter().any(|p| p.ends_with("a.txt")));
        assert_eq!(summary.duplicate_files, 1);
        assert_eq!(
            groups[0].deletion_candidates()[0].path(),
            newer.canonicalize().unwrap().as_path()
        );
    }
}
