//! Exit codes and structured error reporting.

use serde::Serialize;

use crate::config::ConfigError;
use crate::duplicates::FinderError;

/// Process exit codes.
///
/// - 0: completed, including "nothing to do" and a declined prompt
/// - 1: unexpected failure
/// - 2: configuration error (bad pattern, unusable directory, bad config file)
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Run completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The run could not start because of its configuration.
    ConfigError = 2,
    /// Interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "ND000",
            Self::GeneralError => "ND001",
            Self::ConfigError => "ND002",
            Self::Interrupted => "ND130",
        }
    }

    /// Pick the exit code for an error that ended the run.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        if let Some(finder) = err.downcast_ref::<FinderError>() {
            return match finder {
                FinderError::Interrupted => Self::Interrupted,
                FinderError::Pattern(_) | FinderError::Root(_) => Self::ConfigError,
            };
        }
        if err.downcast_ref::<ConfigError>().is_some() {
            return Self::ConfigError;
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "ND002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::PatternError;
    use crate::scanner::ScanError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::ConfigError.as_i32(), 2);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
        assert_eq!(ExitCode::ConfigError.code_prefix(), "ND002");
    }

    #[test]
    fn test_from_error_pattern_is_config() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = anyhow::Error::new(FinderError::Pattern(PatternError::Invalid {
            pattern: "(".to_string(),
            source,
        }));
        assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
    }

    #[test]
    fn test_from_error_root_and_interrupt() {
        let err = anyhow::Error::new(FinderError::Root(ScanError::NotFound(PathBuf::from(
            "/nope",
        ))));
        assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);

        let err = anyhow::Error::new(FinderError::Interrupted);
        assert_eq!(ExitCode::from_error(&err), ExitCode::Interrupted);
    }

    #[test]
    fn test_from_error_context_preserved() {
        let err = anyhow::Error::new(FinderError::Interrupted).context("while scanning");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Interrupted);

        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_structured_error_json() {
        let err = anyhow::anyhow!("boom");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        let json = serde_json::to_string(&structured).unwrap();
        assert!(json.contains("\"code\":\"ND001\""));
        assert!(json.contains("\"message\":\"boom\""));
        assert!(!structured.interrupted);
    }
}
