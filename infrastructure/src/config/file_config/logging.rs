//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every remote result
    pub conversation_log: Option<String>,
    /// Directory for the rolling diagnostic log file
    pub log_dir: Option<String>,
}
