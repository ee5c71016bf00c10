use shared::services::errors::token_service_errors::TokenServiceError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthServiceError {
    InvalidCredentials,
    /// A required request field was blank.
    MissingField(&'static str),
    InvalidToken,
    ExpiredToken,
    RevokedToken,
    JwtError(String),
}

impl fmt::Display for AuthServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthServiceError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthServiceError::MissingField(field) => write!(f, "Missing field: {}", field),
            AuthServiceError::InvalidToken => write!(f, "Invalid token"),
            AuthServiceError::ExpiredToken => write!(f, "Token has expired"),
            AuthServiceError::RevokedToken => write!(f, "Token has been revoked"),
            AuthServiceError::JwtError(msg) => write!(f, "JWT error: {}", msg),
        }
    }
}

impl std::error::Error for AuthServiceError {}

impl From<TokenServiceError> for AuthServiceError {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::ExpiredToken => AuthServiceError::ExpiredToken,
            TokenServiceError::InvalidToken | TokenServiceError::WrongTokenType => {
                AuthServiceError::InvalidToken
            }
            TokenServiceError::JwtError(msg) => AuthServiceError::JwtError(msg),
        }
    }
}
