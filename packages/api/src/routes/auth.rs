use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{debug, error};

use crate::{error::ApiError, state::AppState};
use shared::models::auth::requests::{LoginRequest, RefreshRequest};
use shared::models::auth::responses::TokenResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token/", post(login))
        .route("/auth/token/refresh/", post(refresh))
        .route("/auth/logout/", post(logout))
}

async fn login(
    State(state): State<AppState>,
    Json(login_data): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    state
        .auth_service
        .authenticate_user(&login_data.username, &login_data.password)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to authenticate user {}: {}", login_data.username, e);
            ApiError::from(e)
        })
}

async fn refresh(
    State(state): State<AppState>,
    Json(refresh_data): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    state
        .auth_service
        .refresh(&refresh_data.refresh)
        .await
        .map(Json)
        .map_err(|e| {
            debug!("Refresh rejected: {}", e);
            ApiError::from(e)
        })
}

async fn logout(
    State(state): State<AppState>,
    Json(refresh_data): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service
        .logout(&refresh_data.refresh)
        .await
        .map_err(|e| {
            debug!("Logout rejected: {}", e);
            ApiError::from(e)
        })?;
    Ok(StatusCode::RESET_CONTENT)
}
