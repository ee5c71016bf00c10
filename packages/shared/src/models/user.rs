use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::auth::claims::TokenClaims;
use crate::models::ids::ObjectId;

/// Portal a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manufacturer,
    Retailer,
    Technician,
    Client,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manufacturer => "manufacturer",
            UserRole::Retailer => "retailer",
            UserRole::Technician => "technician",
            UserRole::Client => "client",
            UserRole::Unknown => "unknown",
        }
    }
}

/// Identity of the signed-in user, recomputed from the access token claims.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionUser {
    pub user_id: Option<ObjectId>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn from_claims(claims: &TokenClaims) -> Self {
        SessionUser {
            user_id: claims.user_id.clone(),
            username: claims.username.clone(),
            email: claims.email.clone(),
            role: claims.role,
            expires_at: claims.expires_at(),
        }
    }

    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .or_else(|| self.user_id.as_ref().map(|id| format!("user #{}", id)))
            .unwrap_or_else(|| "unknown user".to_string())
    }
}
