//! Ctrl+C handling for graceful shutdown.
//!
//! The first Ctrl+C raises a shared flag that the walker and the delete loop
//! poll between files, so a deletion in progress is never cut in half. A
//! second Ctrl+C exits immediately with [`EXIT_CODE_INTERRUPTED`].
//!
//! ```rust,no_run
//! use namedupe::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let shutdown_flag = handler.get_flag();
//! // Pass shutdown_flag to DuplicateFinder and DeleteConfig.
//! # drop(shutdown_flag);
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption, 128 + SIGINT.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag for the finder and the deleter.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Reset the shutdown flag to `false`.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the Ctrl+C handler, once per process.
///
/// Later calls (several `run_app` invocations in one test binary) get the
/// already installed handler back with its flag reset.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the OS refuses the handler and
/// none was installed before.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            let _ = writeln!(std::io::stderr(), "\nInterrupted again, exiting now.");
            std::process::exit(EXIT_CODE_INTERRUPTED);
        }

        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Finishing the current file (Ctrl+C again to abort)..."
        );
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    });

    match installed {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(GLOBAL_HANDLER.get().cloned().unwrap_or(handler))
        }
        Err(e) => match GLOBAL_HANDLER.get() {
            Some(existing) => {
                existing.reset();
                Ok(existing.clone())
            }
            None => Err(SignalError::InstallFailed(e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raised(handler: &ShutdownHandler) -> bool {
        handler.get_flag().load(Ordering::SeqCst)
    }

    #[test]
    fn test_new_handler_is_clear() {
        assert!(!raised(&ShutdownHandler::new()));
        assert!(!raised(&ShutdownHandler::default()));
    }

    #[test]
    fn test_flag_shared_and_reset() {
        let handler = ShutdownHandler::new();
        handler.get_flag().store(true, Ordering::SeqCst);

        let cloned = handler.clone();
        assert!(raised(&handler));
        assert!(raised(&cloned));

        cloned.reset();
        assert!(!raised(&handler));
    }

    #[test]
    fn test_install_handler_twice_clears_shared_flag() {
        let first = install_handler().unwrap();
        first.get_flag().store(true, Ordering::SeqCst);

        let second = install_handler().unwrap();
        assert!(!raised(&second));
        assert!(!raised(&first));
    }

    #[test]
    fn test_shutdown_handler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShutdownHandler>();
    }
}
