//! Root path validation and display helpers.
//!
//! # Example
//!
//! ```
//! use namedupe::scanner::path_utils::expand_tilde;
//! use std::path::Path;
//!
//! // Paths without a leading `~` are returned unchanged
//! assert_eq!(expand_tilde(Path::new("/tmp/data")), Path::new("/tmp/data"));
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

use super::ScanError;

/// Replace a leading `~` component with the user's home directory.
///
/// Returns the path unchanged if it has no leading `~` or the home
/// directory cannot be determined.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(components.as_path()),
            None => {
                log::debug!("Home directory unknown, leaving {} as is", path.display());
                path.to_path_buf()
            }
        },
        _ => path.to_path_buf(),
    }
}

/// Resolve and check the directory to scan.
///
/// Expands `~`, canonicalizes, and verifies the result is a readable
/// directory.
///
/// # Errors
///
/// - `NotFound` if the path does not exist
/// - `NotADirectory` if it exists but is not a directory
/// - `PermissionDenied` if it cannot be accessed
pub fn validate_root(path: &Path) -> Result<PathBuf, ScanError> {
    let expanded = expand_tilde(path);

    let resolved = expanded.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::NotFound(expanded.clone()),
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(expanded.clone()),
        _ => ScanError::Io {
            path: expanded.clone(),
            source: e,
        },
    })?;

    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory(resolved));
    }

    std::fs::read_dir(&resolved).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(resolved.clone()),
        _ => ScanError::Io {
            path: resolved.clone(),
            source: e,
        },
    })?;

    log::debug!("Scan root resolved to {}", resolved.display());
    Ok(resolved)
}

/// Location of `path` relative to `root`, for report output.
///
/// Files directly in the root are shown as `.`.
#[must_use]
pub fn display_location(path: &Path, root: &Path) -> String {
    let parent = path.parent().unwrap_or(path);
    match parent.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => parent.display().to_string(),
    }
}
