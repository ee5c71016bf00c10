use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ids::ObjectId;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT payload as issued by the backend's token endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    pub exp: i64, // expiration time (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_expiring_at(exp: i64) -> TokenClaims {
        TokenClaims {
            token_type: Some(TokenType::Access),
            exp,
            iat: None,
            jti: None,
            user_id: Some(ObjectId::Number(3)),
            username: Some("retail.bob".to_string()),
            email: None,
            role: Some(UserRole::Retailer),
        }
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let claims = claims_expiring_at(now.timestamp());
        assert!(claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_deserializes_backend_payload() {
        let payload = r#"{
            "token_type": "access",
            "exp": 1900000000,
            "iat": 1899999700,
            "jti": "3f0c",
            "user_id": 12,
            "username": "admin",
            "role": "admin"
        }"#;

        let claims: TokenClaims = serde_json::from_str(payload).unwrap();
        assert_eq!(claims.token_type, Some(TokenType::Access));
        assert_eq!(claims.user_id, Some(ObjectId::Number(12)));
        assert_eq!(claims.role, Some(UserRole::Admin));
        assert_eq!(claims.expires_at().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_only_exp_is_required() {
        let claims: TokenClaims = serde_json::from_str(r#"{"exp": 10}"#).unwrap();
        assert!(claims.username.is_none());
        assert!(claims.is_expired());
    }
}
