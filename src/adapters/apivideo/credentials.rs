//! Bearer token acquisition for the api.video API.

use super::TOKEN_EXPIRY_MARGIN_SECS;
use crate::config::SyncConfig;
use crate::error::AuthError;
use crate::ports::credentials::CredentialPort;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct Token {
    access: String,
    refresh: String,
    expires_at: Instant,
}

impl Token {
    fn from_response(response: TokenResponse) -> Self {
        Self {
            access: response.access_token,
            refresh: response.refresh_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Exchanges the configured API key for a bearer token and keeps it fresh.
///
/// Clones share the cached token.
#[derive(Clone)]
pub struct ApiKeyCredentials {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    token: Arc<Mutex<Option<Token>>>,
}

impl ApiKeyCredentials {
    pub fn new(config: &SyncConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    async fn exchange_api_key(&self) -> Result<Token, AuthError> {
        let api_key = self.api_key.as_deref().ok_or(AuthError::MissingApiKey)?;
        info!("Requesting access token");
        self.request_token("auth/api-key", json!({ "apiKey": api_key }))
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        debug!("Refreshing access token");
        self.request_token("auth/refresh", json!({ "refreshToken": refresh_token }))
            .await
    }

    async fn request_token(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Token, AuthError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(Token::from_response(parsed))
    }
}

#[async_trait]
impl CredentialPort for ApiKeyCredentials {
    async fn ensure_valid_token(&self) -> Result<(), AuthError> {
        self.bearer_token().await.map(|_| ())
    }

    async fn bearer_token(&self) -> Result<String, AuthError> {
        // Held across the request so concurrent callers share one exchange.
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.access.clone());
            }
        }

        let renewed = match guard.take() {
            Some(expired) => match self.refresh(&expired.refresh).await {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, exchanging API key again");
                    self.exchange_api_key().await?
                }
            },
            None => self.exchange_api_key().await?,
        };

        let access = renewed.access.clone();
        *guard = Some(renewed);
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: u64) -> Token {
        Token::from_response(TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in,
        })
    }

    #[test]
    fn test_token_freshness_margin() {
        assert!(token(3600).is_fresh());
        assert!(!token(TOKEN_EXPIRY_MARGIN_SECS).is_fresh());
        assert!(!token(0).is_fresh());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let config = SyncConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            ..Default::default()
        };
        let credentials = ApiKeyCredentials::new(&config).unwrap();

        let result = credentials.ensure_valid_token().await;

        assert!(matches!(result, Err(AuthError::MissingApiKey)));
    }
}
