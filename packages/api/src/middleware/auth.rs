use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::ids::ObjectId;
use shared::models::user::UserRole;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Option<ObjectId>,
    pub username: Option<String>,
    pub role: Option<UserRole>,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.auth_service.verify_access(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        })
    }
}
