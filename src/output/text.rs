//! Human-readable report and deletion progress.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use yansi::Paint;

use super::local_time;
use crate::actions::delete::{BatchDeleteResult, DeleteProgressCallback};
use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::scanner::path_utils::display_location;
use crate::scanner::{FileEntry, TimeSource};

const GROUP_SEPARATOR: &str = "--------------------";
const SUMMARY_RULE: &str = "--------------------------------------";

/// Text report of a scan.
pub struct TextReport<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    time_source: TimeSource,
}

impl<'a> TextReport<'a> {
    /// Create a report.
    #[must_use]
    pub fn new(
        groups: &'a [DuplicateGroup],
        summary: &'a ScanSummary,
        time_source: TimeSource,
    ) -> Self {
        Self {
            groups,
            summary,
            time_source,
        }
    }

    fn root(&self) -> &Path {
        &self.summary.root
    }

    /// Write the full report: groups, removal summary, skipped files.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Scanned {} file(s) in '{}'.",
            self.summary.total_files,
            self.root().display()
        )?;

        if self.groups.is_empty() {
            writeln!(out, "No groups with duplicate files found.")?;
        } else {
            self.write_groups(out)?;
            self.write_removal_summary(out)?;
        }

        self.write_skipped(out)
    }

    fn write_groups<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "--- Duplicate Groups Found ---".bold())?;

        for group in self.groups {
            writeln!(out, "Group '{}'", group.key.bold())?;

            let keep = group.survivor();
            writeln!(
                out,
                "  {} '{}' (oldest, {} {})",
                "Keeping: ".green(),
                keep.file_name(),
                self.time_source,
                local_time(keep.timestamp)
            )?;
            self.write_location(out, keep)?;

            for dup in group.duplicates() {
                writeln!(
                    out,
                    "  {} '{}' ({}) ({} {})",
                    "Deleting:".red(),
                    dup.file_name(),
                    ByteSize::b(dup.size),
                    self.time_source,
                    local_time(dup.timestamp)
                )?;
                self.write_location(out, dup)?;
            }
            writeln!(out, "{GROUP_SEPARATOR}")?;
        }
        Ok(())
    }

    fn write_location<W: Write + ?Sized>(&self, out: &mut W, entry: &FileEntry) -> io::Result<()> {
        writeln!(
            out,
            "    Location: {}",
            display_location(&entry.path, self.root()).dim()
        )
    }

    fn write_removal_summary<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let mut to_remove: Vec<&FileEntry> = self
            .groups
            .iter()
            .flat_map(DuplicateGroup::duplicates)
            .collect();
        to_remove.sort_by_cached_key(|e| e.path.to_string_lossy().to_lowercase());

        writeln!(out)?;
        writeln!(out, "{}", "--- Summary of Files to be Removed ---".bold())?;
        for entry in &to_remove {
            writeln!(out, "- '{}' ({})", entry.file_name(), ByteSize::b(entry.size))?;
            writeln!(
                out,
                "  Location: {}",
                display_location(&entry.path, self.root()).dim()
            )?;
        }
        writeln!(out, "{SUMMARY_RULE}")?;
        writeln!(
            out,
            "Found {} duplicate file(s) to delete (total size: {}).",
            to_remove.len().bold(),
            ByteSize::b(self.summary.reclaimable_space).bold()
        )
    }

    fn write_skipped<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        if !self.summary.has_errors() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format!("Skipped {} file(s):", self.summary.scan_errors.len()).yellow()
        )?;
        for error in &self.summary.scan_errors {
            writeln!(out, "  - {error}")?;
        }
        Ok(())
    }
}

/// Close a dry run: what would have been deleted, and that nothing was.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_dry_run_outcome<W: Write + ?Sized>(out: &mut W, result: &BatchDeleteResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}.", result.summary())?;
    for (path, error) in &result.failures {
        writeln!(out, "  {} {}: {}", "Would fail:".red(), path.display(), error)?;
    }
    writeln!(
        out,
        "{}",
        "This was a dry run. No files were deleted.".yellow()
    )
}

/// Per-file deletion progress for the text format.
pub struct TextProgress<W: Write> {
    out: RefCell<W>,
    root: PathBuf,
}

impl<W: Write> TextProgress<W> {
    /// Report progress to `out`, with locations relative to `root`.
    pub fn new(out: W, root: &Path) -> Self {
        Self {
            out: RefCell::new(out),
            root: root.to_path_buf(),
        }
    }

    // A broken stdout must not stop the deletions; the log still has them.
    fn emit(&self, args: std::fmt::Arguments<'_>) {
        let mut out = self.out.borrow_mut();
        let written = out.write_fmt(args);
        if let Err(e) = written.and_then(|()| out.flush()) {
            log::debug!("Cannot write progress: {}", e);
        }
    }
}

impl<W: Write> DeleteProgressCallback for TextProgress<W> {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        if index == 0 {
            self.emit(format_args!("\nDeleting {total} file(s)...\n"));
        }
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
        self.emit(format_args!(
            "Deleting: '{}' Location: {}...",
            name,
            display_location(path, &self.root)
        ));
    }

    fn on_delete_success(&self, _path: &Path, _size: u64) {
        self.emit(format_args!(" {}\n", "Success.".green()));
    }

    fn on_delete_failure(&self, _path: &Path, error: &str) {
        self.emit(format_args!(" {} {}\n", "Error:".red(), error));
    }

    fn on_complete(&self, result: &BatchDeleteResult) {
        self.emit(format_args!("\n{}.\n", result.summary()));
        if result.interrupted {
            self.emit(format_args!(
                "{}\n",
                "Interrupted; remaining files were left untouched.".yellow()
            ));
        }
    }
}
