//! Token provider reading the environment on every call.

use async_trait::async_trait;
use shoplens_application::ports::credentials::{CredentialError, TokenProvider};

/// Reads the bearer token from an environment variable before each request,
/// falling back to a token from the config file.
///
/// Re-reading the variable lets an external login helper rotate the token
/// while a chat session is running.
pub struct EnvTokenProvider {
    env_var: String,
    fallback: Option<String>,
}

impl EnvTokenProvider {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, token: Option<String>) -> Self {
        self.fallback = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    fn resolve(&self, from_env: Option<String>) -> Result<String, CredentialError> {
        from_env
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| CredentialError::Missing(self.env_var.clone()))
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        self.resolve(std::env::var(&self.env_var).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_wins_over_fallback() {
        let provider = EnvTokenProvider::new("X").with_fallback(Some("file".to_string()));
        assert_eq!(provider.resolve(Some(" env \n".to_string())).unwrap(), "env");
    }

    #[test]
    fn test_fallback_used_when_env_empty() {
        let provider = EnvTokenProvider::new("X").with_fallback(Some("file".to_string()));
        assert_eq!(provider.resolve(Some(String::new())).unwrap(), "file");
        assert_eq!(provider.resolve(None).unwrap(), "file");
    }

    #[test]
    fn test_missing_names_the_variable() {
        let provider = EnvTokenProvider::new("SHOPLENS_TOKEN").with_fallback(Some(" ".into()));
        assert_eq!(
            provider.resolve(None),
            Err(CredentialError::Missing("SHOPLENS_TOKEN".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unset_variable_without_fallback() {
        let provider = EnvTokenProvider::new("SHOPLENS_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(provider.bearer_token().await.is_err());
    }
}
