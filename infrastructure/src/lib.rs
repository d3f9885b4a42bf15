//! Infrastructure layer for shoplens
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP analysis gateway, bearer token
//! sources, JSONL conversation logging, image normalization and
//! configuration file loading.

pub mod config;
pub mod credentials;
pub mod http;
pub mod image;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuthConfig, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileOutputConfig, FileProgressConfig,
};
pub use credentials::EnvTokenProvider;
pub use http::HttpAnalysisGateway;
pub use image::{ImageLoadError, ImageLoader};
pub use logging::JsonlConversationLogger;
