//! Layered application configuration.
//!
//! Settings are merged from, lowest to highest priority:
//! 1. Built-in defaults
//! 2. A TOML file (`config.toml` in the platform config directory, or the
//!    file given with `--config`)
//! 3. `NAMEDUPE_*` environment variables (e.g. `NAMEDUPE_RECURSIVE=true`)
//! 4. Command-line flags
//!
//! ```toml
//! pattern = '\s*\(\d+\)'
//! detect_copy = true
//! recursive = false
//! time_source = "modified"
//! follow_symlinks = false
//! output = "text"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::DEFAULT_PATTERN;
use crate::scanner::TimeSource;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "NAMEDUPE_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// The merged configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The configuration could not be rendered as TOML.
    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regex for numeric duplicate markers.
    pub pattern: String,
    /// Also strip `.copy` / ` - copy` markers.
    pub detect_copy: bool,
    /// Scan subdirectories.
    pub recursive: bool,
    /// Timestamp used to pick the survivor.
    pub time_source: TimeSource,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            detect_copy: false,
            recursive: false,
            time_source: TimeSource::default(),
            follow_symlinks: false,
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit` if given, otherwise from the
    /// default platform location (if that file exists).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` does not exist, and
    /// [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_path(path)
            }
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults and environment");
                    Self::from_figment(Self::base_figment())
                }
            },
        }
    }

    /// Load configuration with `path` as the TOML layer.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or the environment
    /// holds values of the wrong type.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(figment)
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Default platform-specific configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "namedupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded configuration.
    ///
    /// Boolean flags can only switch a setting on; options replace the
    /// configured value when given.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(pattern) = &cli.pattern {
            self.pattern.clone_from(pattern);
        }
        if let Some(time) = cli.time {
            self.time_source = time.into();
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        self.detect_copy |= cli.copy;
        self.recursive |= cli.recursive;
        self.follow_symlinks |= cli.follow_symlinks;
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
