//! CSV output: one row per file proposed for deletion.
//!
//! # Columns
//!
//! - `path`: path of the file to delete
//! - `size`: file size in bytes
//! - `timestamp`: the timestamp used for survivor selection (RFC 3339)
//! - `survivor`: path of the file kept in its place

use std::io;

use serde::Serialize;
use thiserror::Error;

use super::rfc3339;
use crate::duplicates::DeletionCandidate;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow {
    path: String,
    size: u64,
    timestamp: String,
    survivor: String,
}

impl From<&DeletionCandidate> for CsvRow {
    fn from(candidate: &DeletionCandidate) -> Self {
        Self {
            path: candidate.file.path.to_string_lossy().into_owned(),
            size: candidate.file.size,
            timestamp: rfc3339(candidate.file.timestamp),
            survivor: candidate.survivor.path.to_string_lossy().into_owned(),
        }
    }
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    candidates: &'a [DeletionCandidate],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(candidates: &'a [DeletionCandidate]) -> Self {
        Self { candidates }
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header is written even when there are no rows.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(["path", "size", "timestamp", "survivor"])?;
        for candidate in self.candidates {
            csv_writer.serialize(CsvRow::from(candidate))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
