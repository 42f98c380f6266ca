use crate::error::AuthError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialPort: Send + Sync {
    /// Make sure a usable token is available, acquiring or refreshing it if needed
    async fn ensure_valid_token(&self) -> Result<(), AuthError>;

    /// Current bearer token for the `Authorization` header
    async fn bearer_token(&self) -> Result<String, AuthError>;
}
