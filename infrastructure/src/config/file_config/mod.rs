//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod auth;
mod backend;
mod logging;
mod output;
mod progress;

pub use auth::{DEFAULT_TOKEN_ENV, FileAuthConfig};
pub use backend::{DEFAULT_BASE_URL, FileBackendConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use progress::FileProgressConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("backend.base_url must start with http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),

    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("progress.{0} cannot be 0")]
    ZeroInterval(&'static str),

    #[error("auth.token_env cannot be empty")]
    EmptyTokenEnv,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Analysis service location
    pub backend: FileBackendConfig,
    /// Bearer token source
    pub auth: FileAuthConfig,
    /// Simulated progress cadence and health polling
    pub progress: FileProgressConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file locations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl(base_url.to_string()));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let intervals = [
            ("detection_step_ms", self.progress.detection_step_ms),
            ("analysis_step_ms", self.progress.analysis_step_ms),
            ("health_poll_seconds", self.progress.health_poll_seconds),
        ];
        if let Some((name, _)) = intervals.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroInterval(name));
        }

        if self.auth.token_env.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTokenEnv);
        }

        Ok(())
    }
}
