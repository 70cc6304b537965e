//! JSON output formatter.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "dry_run": true,
//!   "groups": [
//!     {
//!       "key": "report.txt",
//!       "directory": "/data",
//!       "survivor": { "path": "/data/report.txt", "size": 10, "timestamp": "..." },
//!       "duplicates": [{ "path": "/data/report (1).txt", "size": 12, "timestamp": "..." }]
//!     }
//!   ],
//!   "candidates": [{ "path": "/data/report (1).txt", "size": 12, "survivor": "/data/report.txt" }],
//!   "skipped": [{ "path": "/data/locked.txt", "reason": "Permission denied: /data/locked.txt" }],
//!   "summary": {
//!     "root": "/data",
//!     "total_files": 3,
//!     "total_size": 34,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 12,
//!     "scan_duration_ms": 3,
//!     "exit_code": 0,
//!     "exit_code_name": "ND000"
//!   },
//!   "deletion": null
//! }
//! ```
//!
//! `deletion` is filled in once a real deletion has run.

use std::io::Write;

use serde::Serialize;

use super::rfc3339;
use crate::actions::delete::BatchDeleteResult;
use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FileEntry;

/// A file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as scanned
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Timestamp used for survivor selection (RFC 3339)
    pub timestamp: String,
}

impl JsonFile {
    /// Create a JSON file from a FileEntry.
    #[must_use]
    pub fn from_entry(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.to_string_lossy().into_owned(),
            size: entry.size,
            timestamp: rfc3339(entry.timestamp),
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Group key
    pub key: String,
    /// Directory shared by all members
    pub directory: String,
    /// The file that is kept
    pub survivor: JsonFile,
    /// Files proposed for deletion
    pub duplicates: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.clone(),
            directory: group.directory.to_string_lossy().into_owned(),
            survivor: JsonFile::from_entry(group.survivor()),
            duplicates: group.duplicates().iter().map(JsonFile::from_entry).collect(),
        }
    }
}

/// A deletion candidate in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCandidate {
    /// File to delete
    pub path: String,
    /// Its size in bytes
    pub size: u64,
    /// File kept in its place
    pub survivor: String,
}

/// A file skipped during the scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSkipped {
    /// Path that could not be read
    pub path: String,
    /// Why it was skipped
    pub reason: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Resolved scan root
    pub root: String,
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
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "ND000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            root: summary.root.to_string_lossy().into_owned(),
            total_files: summary.total_files,
            total_size: summary.total_size,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A failed deletion.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// File that could not be deleted
    pub path: String,
    /// Error message
    pub error: String,
}

/// Outcome of a real deletion run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletion {
    /// Deleted files
    pub deleted: Vec<String>,
    /// Files that could not be deleted
    pub failed: Vec<JsonFailure>,
    /// Bytes freed
    pub bytes_freed: u64,
    /// Whether Ctrl+C stopped the batch
    pub interrupted: bool,
}

impl JsonDeletion {
    /// Create from a batch result.
    #[must_use]
    pub fn from_batch(result: &BatchDeleteResult) -> Self {
        Self {
            deleted: result
                .successes
                .iter()
                .map(|r| r.path.to_string_lossy().into_owned())
                .collect(),
            failed: result
                .failures
                .iter()
                .map(|(path, error)| JsonFailure {
                    path: path.to_string_lossy().into_owned(),
                    error: error.clone(),
                })
                .collect(),
            bytes_freed: result.bytes_freed,
            interrupted: result.interrupted,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Whether this run only reports
    pub dry_run: bool,
    /// Duplicate groups in first-seen order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Every file proposed for deletion
    pub candidates: Vec<JsonCandidate>,
    /// Files skipped during the scan
    pub skipped: Vec<JsonSkipped>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Deletion outcome, if deletion ran
    pub deletion: Option<JsonDeletion>,
}

impl JsonOutput {
    /// Create a new JSON output.
    ///
    /// # Example
    ///
    /// ```
    /// use namedupe::duplicates::ScanSummary;
    /// use namedupe::error::ExitCode;
    /// use namedupe::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), true, ExitCode::Success);
    /// assert!(output.groups.is_empty());
    /// assert!(output.dry_run);
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        summary: &ScanSummary,
        dry_run: bool,
        exit_code: ExitCode,
    ) -> Self {
        let candidates = groups
            .iter()
            .flat_map(|group| {
                let survivor = group.survivor().path.to_string_lossy().into_owned();
                group.duplicates().iter().map(move |dup| JsonCandidate {
                    path: dup.path.to_string_lossy().into_owned(),
                    size: dup.size,
                    survivor: survivor.clone(),
                })
            })
            .collect();

        Self {
            dry_run,
            groups: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            candidates,
            skipped: summary
                .scan_errors
                .iter()
                .map(|e| JsonSkipped {
                    path: e.path().to_string_lossy().into_owned(),
                    reason: e.to_string(),
                })
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            deletion: None,
        }
    }

    /// Attach the outcome of a deletion run.
    #[must_use]
    pub fn with_deletion(mut self, result: &BatchDeleteResult) -> Self {
        self.deletion = Some(JsonDeletion::from_batch(result));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::delete::DeleteResult;
    use crate::scanner::ScanError;
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(path: &str, size: u64, secs: u64) -> FileEntry {
        FileEntry::new(
            PathBuf::from(path),
            size,
            UNIX_EPOCH + Duration::from_secs(secs),
        )
    }

    fn create_test_groups() -> Vec<DuplicateGroup> {
        vec![DuplicateGroup::new(
            "report.txt".to_string(),
            PathBuf::from("/data"),
            vec![
                entry("/data/report (2).txt", 30, 300),
                entry("/data/report.txt", 10, 100),
                entry("/data/report (1).txt", 20, 200),
            ],
        )]
    }

    fn create_test_summary() -> ScanSummary {
        ScanSummary {
            root: PathBuf::from("/data"),
            total_files: 4,
            total_size: 65,
            duplicate_groups: 1,
            duplicate_files: 2,
            reclaimable_space: 50,
            scan_duration: Duration::from_millis(1234),
            scan_errors: vec![ScanError::PermissionDenied(PathBuf::from("/data/locked"))],
        }
    }

    #[test]
    fn test_json_output_empty() {
        let output = JsonOutput::new(&[], &ScanSummary::default(), false, ExitCode::Success);
        assert!(output.groups.is_empty());
        assert!(output.candidates.is_empty());
        assert!(output.deletion.is_none());
        assert_eq!(output.summary.total_files, 0);
    }

    #[test]
    fn test_json_output_with_groups() {
        let output = JsonOutput::new(
            &create_test_groups(),
            &create_test_summary(),
            true,
            ExitCode::Success,
        );

        assert_eq!(output.groups.len(), 1);
        assert_eq!(output.groups[0].survivor.path, "/data/report.txt");
        assert_eq!(output.groups[0].duplicates.len(), 2);
        assert_eq!(output.candidates.len(), 2);
        assert_eq!(output.candidates[0].path, "/data/report (1).txt");
        assert_eq!(output.candidates[1].survivor, "/data/report.txt");
        assert_eq!(output.skipped.len(), 1);
        assert_eq!(output.summary.scan_duration_ms, 1234);
    }

    #[test]
    fn test_json_is_valid() {
        let output = JsonOutput::new(
            &create_test_groups(),
            &create_test_summary(),
            true,
            ExitCode::Success,
        );
        let json = output.to_json().unwrap();
        assert!(!json.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["dry_run"], serde_json::Value::Bool(true));
        assert_eq!(parsed["groups"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["summary"]["exit_code_name"], "ND000");
        assert!(parsed["deletion"].is_null());
    }

    #[test]
    fn test_with_deletion() {
        let mut result = BatchDeleteResult::default();
        result
            .successes
            .push(DeleteResult::new(PathBuf::from("/data/a (1).txt"), 5, false));
        result
            .failures
            .push((PathBuf::from("/data/a (2).txt"), "permission denied".to_string()));
        result.bytes_freed = 5;

        let output = JsonOutput::new(&[], &ScanSummary::default(), false, ExitCode::Success)
            .with_deletion(&result);

        let deletion = output.deletion.unwrap();
        assert_eq!(deletion.deleted, vec!["/data/a (1).txt"]);
        assert_eq!(deletion.failed[0].error, "permission denied");
        assert_eq!(deletion.bytes_freed, 5);
    }

    #[test]
    fn test_write_to() {
        let output = JsonOutput::new(&[], &ScanSummary::default(), false, ExitCode::Success);
        let mut buffer = Vec::new();

        output.write_to(&mut buffer).unwrap();

        let written = String::from_utf8(buffer).unwrap();
        assert!(written.starts_with('{'));
        assert!(written.ends_with("}\n"));
    }
}
