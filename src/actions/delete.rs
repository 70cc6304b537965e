//! Permanent deletion of duplicate candidates with a dry-run guard.
//!
//! Every candidate is checked against its scan snapshot first: a file whose
//! size or timestamp moved since the scan is left alone. Failures are
//! collected per file and never stop the batch.
//!
//! # Example
//!
//! ```no_run
//! use namedupe::actions::delete::permanent_delete;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/report (1).txt");
//! match permanent_delete(&path) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::DeletionCandidate;
use crate::scanner::{FileEntry, TimeSource};

/// Why a candidate was not deleted.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The file is gone.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The filesystem refused the removal.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Size or timestamp no longer match the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The selection covers every member of a group.
    #[error("refusing to delete every file of a group")]
    WouldEmptyGroup,

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// A deleted file, or one a dry run would delete.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    pub path: PathBuf,
    pub size: u64,
    pub dry_run: bool,
}

impl DeleteResult {
    #[must_use]
    pub fn new(path: PathBuf, size: u64, dry_run: bool) -> Self {
        Self {
            path,
            size,
            dry_run,
        }
    }
}

/// Outcome of [`delete_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Deleted (or, in dry-run mode, would-be-deleted) files.
    pub successes: Vec<DeleteResult>,
    /// Refused or failed files with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Bytes freed (or that would be freed).
    pub bytes_freed: u64,
    pub dry_run: bool,
    /// Whether the batch stopped early on a shutdown request.
    pub interrupted: bool,
}

impl BatchDeleteResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// One-line summary for reports.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed);
        match (self.dry_run, self.failures.len()) {
            (true, _) => format!(
                "Dry run: {} file(s) would be deleted ({} would be freed)",
                self.success_count(),
                freed
            ),
            (false, 0) => format!(
                "Finished. {} file(s) deleted ({} freed)",
                self.success_count(),
                freed
            ),
            (false, failed) => format!(
                "Finished. {} file(s) deleted, {} failed ({} freed)",
                self.success_count(),
                failed,
                freed
            ),
        }
    }
}

/// Settings for [`delete_batch`].
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Report only; never touch the filesystem.
    pub dry_run: bool,
    /// Timestamp recorded by the scan, compared before deleting.
    pub time_source: TimeSource,
    /// Checked before each file.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DeleteConfig {
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Per-file progress reporting for [`delete_batch`].
pub trait DeleteProgressCallback {
    /// Called before each file is handled.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called when a file was deleted (or would be, in a dry run).
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called when a file was refused or could not be deleted.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called once after the last file.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Compare a file on disk with its scan snapshot.
fn ensure_unchanged(entry: &FileEntry, time_source: TimeSource) -> Result<(), DeleteError> {
    let metadata = fs::metadata(&entry.path).map_err(|e| DeleteError::from_io(&entry.path, e))?;

    let size_moved = metadata.len() != entry.size;
    let time_moved = time_source
        .read(&metadata)
        .is_ok_and(|now| now != entry.timestamp);

    if size_moved || time_moved {
        log::warn!(
            "{} changed since the scan (size {} -> {}, {} time {})",
            entry.path.display(),
            entry.size,
            metadata.len(),
            time_source,
            if time_moved { "moved" } else { "unchanged" }
        );
        return Err(DeleteError::Modified(entry.path.clone()));
    }
    Ok(())
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// `NotFound`, `PermissionDenied` or `Io` from the filesystem.
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

fn delete_candidate(
    candidate: &DeletionCandidate,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    ensure_unchanged(&candidate.file, config.time_source)?;

    if config.dry_run {
        log::debug!("Dry run, keeping {}", candidate.path().display());
        return Ok(DeleteResult::new(
            candidate.file.path.clone(),
            candidate.file.size,
            true,
        ));
    }

    permanent_delete(candidate.path())
}

/// Delete every candidate.
///
/// Each file is handled independently: a failure is recorded and the batch
/// moves on. In dry-run mode nothing is deleted and every candidate that
/// passes the checks is reported as a success.
///
/// Candidates whose group would lose every member are refused.
pub fn delete_batch<C: DeleteProgressCallback>(
    candidates: &[DeletionCandidate],
    config: &DeleteConfig,
    callback: Option<&C>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult {
        dry_run: config.dry_run,
        ..BatchDeleteResult::default()
    };
    let total = candidates.len();
    let refused = unsafe_groups(candidates);

    for (index, candidate) in candidates.iter().enumerate() {
        if config.is_shutdown_requested() {
            log::warn!("Deletion interrupted, {} file(s) left untouched", total - index);
            result.interrupted = true;
            break;
        }

        let path = candidate.path();
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        let outcome = if refused.contains(candidate.survivor.path.as_path()) {
            Err(DeleteError::WouldEmptyGroup)
        } else {
            delete_candidate(candidate, config)
        };

        match outcome {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(path, deleted.size);
                }
                result.successes.push(deleted);
            }
            Err(e) => {
                let reason = e.to_string();
                log::warn!("Failed to delete {}: {}", path.display(), reason);
                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &reason);
                }
                result.failures.push((path.to_path_buf(), reason));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }
    log::debug!("{}", result.summary());

    result
}

/// Survivors whose own group lists them as a candidate too.
fn unsafe_groups(candidates: &[DeletionCandidate]) -> HashSet<&Path> {
    let mut by_survivor: HashMap<&Path, Vec<PathBuf>> = HashMap::new();
    for candidate in candidates {
        by_survivor
            .entry(candidate.survivor.path.as_path())
            .or_default()
            .push(candidate.file.path.clone());
    }

    by_survivor
        .into_iter()
        .filter_map(|(survivor, selected)| {
            let mut group = selected.clone();
            group.push(survivor.to_path_buf());
            validate_preserves_copy(&selected, &group)
                .is_err()
                .then_some(survivor)
        })
        .collect()
}

/// Check that `selected` leaves at least one member of `group` in place.
///
/// # Errors
///
/// Returns `WouldEmptyGroup` if nothing would be left.
///
/// # Example
///
/// ```
/// use namedupe::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![
///     PathBuf::from("/report.txt"),
///     PathBuf::from("/report (1).txt"),
/// ];
///
/// let selected = vec![PathBuf::from("/report (1).txt")];
/// assert!(validate_preserves_copy(&selected, &group).is_ok());
///
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(selected: &[PathBuf], group: &[PathBuf]) -> Result<(), DeleteError> {
    let selected: HashSet<&PathBuf> = selected.iter().collect();
    if group.iter().any(|p| !selected.contains(p)) {
        Ok(())
    } else {
        log::error!("Selection would remove all {} files of a group", group.len());
        Err(DeleteError::WouldEmptyGroup)
    }
}
