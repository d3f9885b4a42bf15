//! Image assets handed to the analysis session.
//!
//! An [`ImageAsset`] is the single encoded still-image representation every
//! remote call works from. It is immutable: uploading a new picture produces a
//! new asset (and a new session) instead of mutating the old one.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Marker separating the data-URL header from the payload.
const BASE64_MARKER: &str = "base64,";

/// Metadata about where an image came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub file_name: String,
    pub media_type: String,
    pub byte_len: u64,
}

/// An encoded still image (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    encoded: String,
    source: Option<ImageSource>,
}

impl ImageAsset {
    /// Create an asset from a data URL or bare base64 payload.
    pub fn new(encoded: impl Into<String>) -> Result<Self, DomainError> {
        let encoded = encoded.into();
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidImage("encoded image is empty".to_string()));
        }
        if trimmed.starts_with("data:") && !trimmed.contains(BASE64_MARKER) {
            return Err(DomainError::InvalidImage(
                "data URL is not base64 encoded".to_string(),
            ));
        }
        Ok(Self {
            encoded: trimmed.to_string(),
            source: None,
        })
    }

    /// Attach the originating file metadata.
    pub fn with_source(mut self, source: ImageSource) -> Self {
        self.source = Some(source);
        self
    }

    /// The full encoded form (data URL when one was supplied).
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The raw base64 payload with any `data:...;base64,` header removed.
    pub fn base64_payload(&self) -> &str {
        match self.encoded.split_once(BASE64_MARKER) {
            Some((_, payload)) => payload,
            None => &self.encoded,
        }
    }

    /// Media type declared by the data URL header, if any.
    pub fn media_type(&self) -> Option<&str> {
        let header = self.encoded.strip_prefix("data:")?;
        let (media_type, _) = header.split_once(';')?;
        Some(media_type)
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Length of the encoded payload, for logging.
    pub fn encoded_len(&self) -> usize {
        self.encoded.len()
    }
}
