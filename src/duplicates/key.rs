//! Group key derivation from file names.
//!
//! # Overview
//!
//! A group key is the name a file would have if its duplicate markers were
//! removed. `report (1).txt` and `report (2).txt` both reduce to
//! `report.txt`; with copy detection enabled `report.copy.txt` and
//! `report - Copy.txt` do too.
//!
//! Cleaning works on the stem only, so the extension always survives. Each
//! pass removes the first regex match and then (if enabled) cuts the stem at
//! the last copy marker. Passes repeat until nothing changes, which removes
//! every match including ones exposed by an earlier removal.
//!
//! # Example
//!
//! ```
//! use namedupe::duplicates::NameNormalizer;
//!
//! let normalizer = NameNormalizer::new(r"\s*\(\d+\)", true).unwrap();
//!
//! assert_eq!(normalizer.group_key("report (1).txt"), "report.txt");
//! assert_eq!(normalizer.group_key("photo.copy.jpg"), "photo.jpg");
//! assert_eq!(normalizer.group_key("notes - Copy (2).md"), "notes.md");
//! ```

use regex::Regex;
use thiserror::Error;

/// Default pattern for numeric duplicate markers such as ` (1)`.
pub const DEFAULT_PATTERN: &str = r"\s*\(\d+\)";

/// Copy markers recognized when copy detection is enabled (lowercase).
const COPY_MARKERS: [&str; 2] = [".copy", " - copy"];

/// Error raised when the configured pattern does not compile.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The regular expression is malformed.
    #[error("invalid regular expression pattern '{pattern}': {source}")]
    Invalid {
        /// The pattern as supplied
        pattern: String,
        /// Compiler diagnostic
        #[source]
        source: regex::Error,
    },
}

/// Derives group keys from file names.
///
/// Holds the compiled duplicate-marker pattern and the copy-detection flag.
/// Key derivation is a pure function of the file name.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    pattern: Regex,
    detect_copy: bool,
}

impl NameNormalizer {
    /// Compile a normalizer.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Invalid`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str, detect_copy: bool) -> Result<Self, PatternError> {
        let compiled = Regex::new(pattern).map_err(|source| PatternError::Invalid {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: compiled,
            detect_copy,
        })
    }

    /// The pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether `.copy` / ` - copy` markers are stripped.
    #[must_use]
    pub fn detects_copies(&self) -> bool {
        self.detect_copy
    }

    /// Reduce a file name to its group key.
    #[must_use]
    pub fn group_key(&self, file_name: &str) -> String {
        let (stem, extension) = split_name(file_name);
        let mut cleaned = stem.to_string();

        loop {
            let before_len = cleaned.len();

            if let Some(found) = self.pattern.find(&cleaned) {
                let range = found.range();
                cleaned.replace_range(range, "");
                cleaned = cleaned.trim().to_string();
            }

            if self.detect_copy {
                if let Some(idx) = last_copy_marker(&cleaned) {
                    cleaned.truncate(idx);
                    cleaned = cleaned.trim().to_string();
                }
            }

            // Every change shortens the stem, so this terminates.
            if cleaned.len() == before_len {
                break;
            }
        }

        if cleaned.is_empty() && !stem.is_empty() {
            log::warn!("Cleaning stem '{}' resulted in an empty name", stem);
        }

        match extension {
            Some(ext) => format!("{cleaned}.{ext}"),
            None => cleaned,
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN, false).expect("default pattern compiles")
    }
}

/// Split a file name into stem and extension.
///
/// The extension is whatever follows the last dot. A leading dot does not
/// start an extension, so `.bashrc` has none.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        None | Some(0) => (name, None),
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
    }
}

/// Byte offset of the last copy marker in `stem`, ignoring ASCII case.
///
/// Markers are matched anywhere, so `photo - Copy2` and `x.copyright` are
/// cut too.
fn last_copy_marker(stem: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets aligned with `stem`.
    let lower = stem.to_ascii_lowercase();
    COPY_MARKERS.iter().filter_map(|marker| lower.rfind(marker)).max()
}
