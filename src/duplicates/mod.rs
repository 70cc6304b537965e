//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Group key derivation from file names ([`key`])
//! - Directory-scoped grouping and survivor selection ([`groups`])
//! - The scan-then-group pipeline ([`finder`])

pub mod finder;
pub mod groups;
pub mod key;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{deletion_candidates, group_by_key, DeletionCandidate, DuplicateGroup, GroupingStats};
pub use key::{NameNormalizer, PatternError, DEFAULT_PATTERN};
