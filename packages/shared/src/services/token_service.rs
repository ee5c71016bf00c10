use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::models::auth::claims::{TokenClaims, TokenType};
use crate::models::credentials::CredentialPair;
use crate::models::ids::ObjectId;
use crate::models::user::UserRole;
use crate::services::errors::token_service_errors::TokenServiceError;

/// Reads the claims of a JWT without checking its signature.
///
/// Clients never hold the signing secret. Expiry is not validated here;
/// callers check [`TokenClaims::is_expired`] themselves.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, TokenServiceError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Unreadable token: {}", e);
            TokenServiceError::InvalidToken
        })
}

/// Identity embedded in issued tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSubject {
    pub user_id: ObjectId,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
}

/// Issues and verifies HS256 token pairs.
#[derive(Clone)]
pub struct TokenService {
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(jwt_secret: String, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        TokenService {
            jwt_secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_pair(&self, subject: &TokenSubject) -> Result<CredentialPair, TokenServiceError> {
        let access = self.issue(subject, TokenType::Access, self.access_ttl)?;
        let refresh = self.issue(subject, TokenType::Refresh, self.refresh_ttl)?;
        Ok(CredentialPair::new(access, refresh))
    }

    pub fn issue_access(&self, subject: &TokenSubject) -> Result<String, TokenServiceError> {
        self.issue(subject, TokenType::Access, self.access_ttl)
    }

    fn issue(
        &self,
        subject: &TokenSubject,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, TokenServiceError> {
        let now = Utc::now();
        let claims = TokenClaims {
            token_type: Some(token_type),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
            jti: Some(Uuid::new_v4().simple().to_string()),
            user_id: Some(subject.user_id.clone()),
            username: Some(subject.username.clone()),
            email: subject.email.clone(),
            role: Some(subject.role),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| TokenServiceError::JwtError(format!("{:#?}", e)))
    }

    /// Checks signature, expiry and token type.
    pub fn verify(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<TokenClaims, TokenServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => token_data.claims,
            Err(err) => {
                debug!("Token verification failed: {}", err);
                return match err.kind() {
                    ErrorKind::ExpiredSignature => Err(TokenServiceError::ExpiredToken),
                    _ => Err(TokenServiceError::InvalidToken),
                }
            }
        };

        if claims.is_expired() {
            return Err(TokenServiceError::ExpiredToken);
        }
        if claims.token_type != Some(expected) {
            debug!("Expected {:?} token, got {:?}", expected, claims.token_type);
            return Err(TokenServiceError::WrongTokenType);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: ObjectId::Number(7),
            username: "tech.jane".to_string(),
            email: Some("jane@hanna.example".to_string()),
            role: UserRole::Technician,
        }
    }

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            secret.to_string(),
            Duration::minutes(5),
            Duration::days(1),
        )
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = service("test-secret-key");
        let pair = service.issue_pair(&subject()).unwrap();

        let access = service.verify(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(access.username.as_deref(), Some("tech.jane"));
        assert_eq!(access.role, Some(UserRole::Technician));

        let refresh = service.verify(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert!(refresh.exp > access.exp);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let service = service("test-secret-key");
        let pair = service.issue_pair(&subject()).unwrap();
        assert_eq!(
            service.verify(&pair.refresh_token, TokenType::Access),
            Err(TokenServiceError::WrongTokenType)
        );
    }

    #[test]
    fn test_different_secrets_do_not_verify() {
        let token = service("secret1").issue_access(&subject()).unwrap();
        assert_eq!(
            service("secret2").verify(&token, TokenType::Access),
            Err(TokenServiceError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = TokenService::new(
            "test-secret-key".to_string(),
            Duration::seconds(-30),
            Duration::days(1),
        );
        let token = expired.issue_access(&subject()).unwrap();
        assert_eq!(
            expired.verify(&token, TokenType::Access),
            Err(TokenServiceError::ExpiredToken)
        );
    }

    #[test]
    fn test_decode_unverified_reads_expired_tokens() {
        let expired = TokenService::new(
            "server-only-secret".to_string(),
            Duration::seconds(-30),
            Duration::days(1),
        );
        let token = expired.issue_access(&subject()).unwrap();

        let claims = decode_unverified(&token).unwrap();
        assert!(claims.is_expired());
        assert_eq!(claims.user_id, Some(ObjectId::Number(7)));
    }

    #[test]
    fn test_decode_unverified_rejects_garbage() {
        assert_eq!(
            decode_unverified("invalid-token"),
            Err(TokenServiceError::InvalidToken)
        );
    }
}
