use std::fmt;

use crate::services::errors::gateway_errors::GatewayError;

pub const SUPPORT_MESSAGE: &str =
    "Login succeeded but no refresh token was issued. Please contact support.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    ValidationError(String),
    InvalidCredentials(String),
    /// The server answered the login without a usable refresh token.
    MissingRefreshToken,
    InvalidToken(String),
    Gateway(GatewayError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SessionError::InvalidCredentials(msg) => write!(f, "{}", msg),
            SessionError::MissingRefreshToken => write!(f, "{}", SUPPORT_MESSAGE),
            SessionError::InvalidToken(msg) => write!(f, "Invalid access token: {}", msg),
            SessionError::Gateway(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Http {
                status: 400 | 401,
                message,
            } => SessionError::InvalidCredentials(message),
            other => SessionError::Gateway(other),
        }
    }
}
