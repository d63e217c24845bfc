// crates/jobcheck-config/src/config.rs
// ============================================================================
// Module: Jobcheck Runner Configuration
// Description: Configuration loading and validation for the runner.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Runner configuration is loaded from a TOML file with strict size limits
//! and validated before any test runs. Invalid configuration fails closed:
//! the runner refuses to start rather than running against a misconfigured
//! target. Command-line flags override file values at the CLI layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default target URL.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080";
/// Default suites directory.
pub const DEFAULT_SUITES_DIR: &str = "./suites";
/// Default timing tolerance percentage.
pub const DEFAULT_TOLERANCE_PCT: f64 = 50.0;
/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Maximum allowed timing tolerance percentage.
pub const MAX_TOLERANCE_PCT: f64 = 1000.0;
/// Maximum allowed transport timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;
/// Highest conformance level accepted by the filter.
pub const MAX_LEVEL_FILTER: u8 = 4;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file exceeds the size limit.
    #[error("config file too large: {actual} bytes (limit {limit})")]
    TooLarge {
        /// Actual file size in bytes.
        actual: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },
    /// Config file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A config field failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

// ============================================================================
// SECTION: Output Format
// ============================================================================

/// Report output formats supported by the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON report.
    Json,
}

// ============================================================================
// SECTION: Runner Configuration
// ============================================================================

/// Complete runner configuration.
///
/// # Invariants
/// - `validate` must pass before the configuration is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Base URL of the implementation under test.
    #[serde(default = "default_target_url")]
    pub target_url: String,
    /// Directory containing test suite JSON files.
    #[serde(default = "default_suites_dir")]
    pub suites_dir: String,
    /// Optional conformance level filter (0-4).
    #[serde(default)]
    pub level: Option<u8>,
    /// Optional category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional single-test filter.
    #[serde(default)]
    pub test_id: Option<String>,
    /// Report output format.
    #[serde(default)]
    pub output: OutputFormat,
    /// Show expected/actual detail for failures.
    #[serde(default)]
    pub verbose: bool,
    /// Timing tolerance percentage for approximate assertions.
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: f64,
    /// Transport timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional reset endpoint invoked before each test.
    #[serde(default)]
    pub reset_url: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            suites_dir: DEFAULT_SUITES_DIR.to_string(),
            level: None,
            category: None,
            test_id: None,
            output: OutputFormat::default(),
            verbose: false,
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reset_url: None,
        }
    }
}

impl RunnerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                actual: metadata.len(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let raw = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every field, failing closed on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url(&self.target_url, "target_url")?;

        if self.suites_dir.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "suites_dir",
                reason: "must not be empty".to_string(),
            });
        }

        if let Some(level) = self.level
            && level > MAX_LEVEL_FILTER
        {
            return Err(ConfigError::Invalid {
                field: "level",
                reason: format!("must be between 0 and {MAX_LEVEL_FILTER}, got {level}"),
            });
        }

        if !(self.tolerance_pct > 0.0 && self.tolerance_pct <= MAX_TOLERANCE_PCT) {
            return Err(ConfigError::Invalid {
                field: "tolerance_pct",
                reason: format!(
                    "must be in (0, {MAX_TOLERANCE_PCT}], got {}",
                    self.tolerance_pct
                ),
            });
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: format!("must be in [1, {MAX_TIMEOUT_SECS}], got {}", self.timeout_secs),
            });
        }

        if let Some(reset_url) = &self.reset_url {
            validate_http_url(reset_url, "reset_url")?;
        }

        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates that a URL parses and uses an http(s) scheme.
fn validate_http_url(raw: &str, field: &'static str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::Invalid {
        field,
        reason: format!("not a valid URL: {err}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}

fn default_suites_dir() -> String {
    DEFAULT_SUITES_DIR.to_string()
}

const fn default_tolerance_pct() -> f64 {
    DEFAULT_TOLERANCE_PCT
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
