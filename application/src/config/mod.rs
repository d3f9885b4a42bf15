//! Application-level configuration.
//!
//! - [`WorkflowParams`]: progress cadence, health polling and fallback messages

pub mod workflow_params;

pub use workflow_params::{ProgressProfile, WorkflowParams};
