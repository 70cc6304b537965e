//! File actions module.
//!
//! This module provides functionality for:
//! - Permanent deletion of duplicate candidates ([`delete`])
//! - Dry-run reporting that leaves the filesystem untouched
//! - Typed confirmation before anything is removed ([`confirm`])
//!
//! ```no_run
//! use namedupe::actions::delete::{delete_batch, DeleteConfig, DeleteProgressCallback};
//! use namedupe::duplicates::DeletionCandidate;
//! # struct Quiet;
//! # impl DeleteProgressCallback for Quiet {
//! #     fn on_before_delete(&self, _: &std::path::Path, _: usize, _: usize) {}
//! #     fn on_delete_success(&self, _: &std::path::Path, _: u64) {}
//! #     fn on_delete_failure(&self, _: &std::path::Path, _: &str) {}
//! #     fn on_complete(&self, _: &namedupe::actions::delete::BatchDeleteResult) {}
//! # }
//!
//! let candidates: Vec<DeletionCandidate> = Vec::new();
//! let result = delete_batch::<Quiet>(&candidates, &DeleteConfig::default().with_dry_run(true), None);
//! println!("{}", result.summary());
//! ```

pub mod confirm;
pub mod delete;
