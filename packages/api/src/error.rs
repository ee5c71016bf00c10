use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::services::errors::{
    auth_service_errors::AuthServiceError, resource_service_errors::ResourceServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    AuthService(AuthServiceError),
    ResourceService(ResourceServiceError),
    /// No bearer token on a protected route.
    Unauthorized,
    UnknownResource(String),
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<ResourceServiceError> for ApiError {
    fn from(error: ResourceServiceError) -> Self {
        ApiError::ResourceService(error)
    }
}

fn detail(message: &str) -> Value {
    json!({ "detail": message })
}

fn token_not_valid() -> Value {
    json!({
        "detail": "Token is invalid or expired",
        "code": "token_not_valid"
    })
}

fn field_error(field: &str, message: &str) -> Value {
    json!({ field: [message] })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::AuthService(AuthServiceError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                detail("No active account found with the given credentials"),
            ),
            ApiError::AuthService(AuthServiceError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                field_error(field, "This field may not be blank."),
            ),
            ApiError::AuthService(
                AuthServiceError::InvalidToken
                | AuthServiceError::ExpiredToken
                | AuthServiceError::RevokedToken,
            ) => (StatusCode::UNAUTHORIZED, token_not_valid()),
            ApiError::AuthService(AuthServiceError::JwtError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("A server error occurred."),
            ),

            ApiError::ResourceService(ResourceServiceError::NotFound)
            | ApiError::UnknownResource(_) => (StatusCode::NOT_FOUND, detail("Not found.")),
            ApiError::ResourceService(ResourceServiceError::InvalidPage) => {
                (StatusCode::NOT_FOUND, detail("Invalid page."))
            }
            ApiError::ResourceService(ResourceServiceError::ValidationError(errors)) => {
                (StatusCode::BAD_REQUEST, Value::Object(errors))
            }

            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                detail("Authentication credentials were not provided."),
            ),
        };

        (status, Json(body)).into_response()
    }
}
