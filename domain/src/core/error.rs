//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No image has been ingested")]
    NoImage,

    #[error("No detected object at index {index} ({len} detected)")]
    NoSuchRegion { index: usize, len: usize },

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Conversation turn {0} is not pending")]
    TurnNotPending(usize),

    #[error("Cannot build session state: {0}")]
    SessionState(String),
}

impl DomainError {
    /// Check if this error was caused by the caller's input rather than by state
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::NoSuchRegion { .. } | DomainError::EmptyQuery | DomainError::InvalidImage(_)
        )
    }
}
