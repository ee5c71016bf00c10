use shared::models::auth::claims::{TokenClaims, TokenType};
use shared::models::auth::responses::TokenResponse;
use shared::services::token_service::{TokenService, TokenSubject};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{ApiConfig, DevUser};
use crate::services::errors::auth_service_errors::AuthServiceError;

/// Issues, refreshes and revokes JWT pairs for the configured dev users.
pub struct AuthService {
    token_service: TokenService,
    users: HashMap<String, DevUser>,
    rotate_refresh_tokens: bool,
    /// `jti`s of refresh tokens that may no longer be used.
    revoked: RwLock<HashSet<String>>,
}

impl AuthService {
    pub fn new(config: &ApiConfig) -> Self {
        AuthService {
            token_service: TokenService::new(
                config.jwt_secret.clone(),
                config.access_token_ttl,
                config.refresh_token_ttl,
            ),
            users: config
                .users
                .iter()
                .map(|user| (user.username.clone(), user.clone()))
                .collect(),
            rotate_refresh_tokens: config.rotate_refresh_tokens,
            revoked: RwLock::new(HashSet::new()),
        }
    }

    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, AuthServiceError> {
        if username.trim().is_empty() {
            return Err(AuthServiceError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthServiceError::MissingField("password"));
        }

        let user = self
            .users
            .get(username.trim())
            .filter(|user| user.password == password)
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let pair = self.token_service.issue_pair(&subject_for(user))?;
        info!("Issued token pair for {}", user.username);
        Ok(TokenResponse {
            access: pair.access_token,
            refresh: Some(pair.refresh_token),
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthServiceError> {
        if refresh_token.trim().is_empty() {
            return Err(AuthServiceError::MissingField("refresh"));
        }

        let claims = self.verify_refresh(refresh_token).await?;
        let user = self.user_for(&claims)?;
        let subject = subject_for(user);

        if !self.rotate_refresh_tokens {
            debug!("Refreshing access token for {}", user.username);
            return Ok(TokenResponse {
                access: self.token_service.issue_access(&subject)?,
                refresh: None,
            });
        }

        if let Some(jti) = &claims.jti {
            self.revoked.write().await.insert(jti.clone());
        }
        let pair = self.token_service.issue_pair(&subject)?;
        debug!("Rotated refresh token for {}", user.username);
        Ok(TokenResponse {
            access: pair.access_token,
            refresh: Some(pair.refresh_token),
        })
    }

    /// Revokes a refresh token. Revoking twice is not an error.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        if refresh_token.trim().is_empty() {
            return Err(AuthServiceError::MissingField("refresh"));
        }

        let claims = match self.verify_refresh(refresh_token).await {
            Ok(claims) => claims,
            Err(AuthServiceError::RevokedToken) => return Ok(()),
            Err(e) => return Err(e),
        };
        if let Some(jti) = claims.jti {
            self.revoked.write().await.insert(jti);
        }
        info!(
            "Revoked refresh token for {}",
            claims.username.as_deref().unwrap_or("unknown user")
        );
        Ok(())
    }

    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        Ok(self.token_service.verify(token, TokenType::Access)?)
    }

    async fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let claims = self.token_service.verify(token, TokenType::Refresh)?;
        if let Some(jti) = &claims.jti {
            if self.revoked.read().await.contains(jti) {
                return Err(AuthServiceError::RevokedToken);
            }
        }
        Ok(claims)
    }

    fn user_for(&self, claims: &TokenClaims) -> Result<&DevUser, AuthServiceError> {
        claims
            .username
            .as_deref()
            .and_then(|username| self.users.get(username))
            .ok_or(AuthServiceError::InvalidToken)
    }
}

fn subject_for(user: &DevUser) -> TokenSubject {
    TokenSubject {
        user_id: user.id.clone(),
        username: user.username.clone(),
        email: None,
        role: user.role,
    }
}
