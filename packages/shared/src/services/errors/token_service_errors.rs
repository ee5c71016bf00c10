use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenServiceError {
    JwtError(String),
    InvalidToken,
    ExpiredToken,
    WrongTokenType,
}

impl fmt::Display for TokenServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenServiceError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            TokenServiceError::InvalidToken => write!(f, "Token is invalid"),
            TokenServiceError::ExpiredToken => write!(f, "Token is expired"),
            TokenServiceError::WrongTokenType => write!(f, "Token has wrong type"),
        }
    }
}

impl std::error::Error for TokenServiceError {}
