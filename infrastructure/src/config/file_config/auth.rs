//! Credential configuration from TOML (`[auth]` section)

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_ENV: &str = "SHOPLENS_TOKEN";

/// Raw auth configuration from TOML
///
/// The environment variable named by `token_env` wins over `token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    /// Bearer token written into the config file
    pub token: Option<String>,
    /// Environment variable read for a fresh token before every call
    pub token_env: String,
}

impl Default for FileAuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}
