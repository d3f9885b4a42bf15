//! Credential port
//!
//! The bearer token comes from an external identity provider. The workflow
//! only asks for a fresh token before each call and attaches it as-is; token
//! lifecycle is the provider's business.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while obtaining a bearer token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CredentialError {
    #[error("No access token configured (set {0})")]
    Missing(String),

    #[error("Access token provider failed: {0}")]
    ProviderFailed(String),
}

/// Capability returning a bearer token for the next request
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, CredentialError>;
}

/// Token provider backed by a fixed string
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::Missing("auth.token".to_string()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.bearer_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_empty_static_token_is_missing() {
        let provider = StaticTokenProvider::new("  ");
        assert!(matches!(
            provider.bearer_token().await,
            Err(CredentialError::Missing(_))
        ));
    }
}
