use async_trait::async_trait;
use shared::models::auth::requests::RefreshRequest;
use shared::models::auth::responses::TokenResponse;
use tracing::debug;

use crate::services::dispatcher::extract_error_message;
use crate::services::errors::refresh_errors::RefreshError;

#[cfg(test)]
use mockall::automock;

/// Exchanges a refresh token for a new access token.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError>;
}

/// Calls the refresh endpoint directly, bypassing the dispatcher.
pub struct HttpTokenRefresher {
    http: reqwest::Client,
    refresh_url: String,
}

impl HttpTokenRefresher {
    pub fn new(http: reqwest::Client, refresh_url: String) -> Self {
        Self { http, refresh_url }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, RefreshError> {
        debug!("Requesting new access token from {}", self.refresh_url);

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token.to_string(),
            })
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(status.as_u16(), &body),
            });
        }

        let token_response: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        if token_response.access.trim().is_empty() {
            return Err(RefreshError::InvalidResponse(
                "empty access token".to_string(),
            ));
        }
        Ok(token_response)
    }
}
