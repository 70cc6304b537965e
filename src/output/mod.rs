//! Report renderers for grouping results.
//!
//! This module provides different output formats:
//! - Text for people, with per-group detail and a deletion summary
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use namedupe::duplicates::DuplicateFinder;
//! use namedupe::error::ExitCode;
//! use namedupe::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, true, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::{write_dry_run_outcome, TextProgress, TextReport};

/// RFC 3339 UTC rendering for machine-readable formats.
#[must_use]
pub fn rfc3339(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.to_rfc3339()
}

/// Local-time rendering for the text report.
#[must_use]
pub fn local_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_rfc3339() {
        let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(rfc3339(time), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_local_time_shape() {
        let rendered = local_time(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        assert_eq!(rendered.len(), "2023-11-14 22:13:20".len());
    }
}
