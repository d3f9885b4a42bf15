//! Configuration file loading for shoplens
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SHOPLENS_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./shoplens.toml` or `./.shoplens.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/shoplens/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, DEFAULT_TOKEN_ENV, FileAuthConfig,
    FileBackendConfig, FileConfig, FileLoggingConfig, FileOutputConfig, FileProgressConfig,
};
pub use loader::ConfigLoader;
