use std::fmt;

use crate::services::errors::refresh_errors::RefreshError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Non-2xx response. `message` is already normalised for display.
    Http { status: u16, message: String },
    Transport(String),
    Decode(String),
    Refresh(RefreshError),
    /// Still unauthorized after a successful refresh and replay.
    SessionExpired,
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            GatewayError::Refresh(RefreshError::Rejected { status, .. }) => Some(*status),
            GatewayError::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Authentication failures are reported through the session layer, not
    /// as generic errors.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::SessionExpired
                | GatewayError::Refresh(_)
                | GatewayError::Http { status: 401, .. }
        )
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GatewayError::Http { message, .. } => write!(f, "{}", message),
            GatewayError::Transport(msg) => write!(f, "Network error: {}", msg),
            GatewayError::Decode(msg) => write!(f, "Unexpected response from server: {}", msg),
            GatewayError::Refresh(err) => write!(f, "{}", err),
            GatewayError::SessionExpired => {
                write!(f, "Your session has expired. Please log in again.")
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<RefreshError> for GatewayError {
    fn from(err: RefreshError) -> Self {
        GatewayError::Refresh(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_message_verbatim() {
        let err = GatewayError::Http {
            status: 404,
            message: "Not found.".to_string(),
        };
        assert_eq!(err.to_string(), "Not found.");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_refresh_errors_are_auth_failures() {
        let err = GatewayError::from(RefreshError::MissingRefreshToken);
        assert!(err.is_auth_failure());
        assert_eq!(err.status(), None);
    }
}
