use std::fmt;

/// Outcome shared by every request waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    MissingRefreshToken,
    Rejected { status: u16, message: String },
    Transport(String),
    InvalidResponse(String),
    /// Too many requests already waiting on the in-flight refresh.
    QueueFull,
    /// The session was replaced or cleared while the refresh was in flight.
    SessionChanged,
    /// The refresh task went away without reporting back.
    Interrupted,
}

impl RefreshError {
    /// Whether this failure means the session cannot recover on its own.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RefreshError::QueueFull | RefreshError::SessionChanged | RefreshError::Interrupted
        )
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RefreshError::MissingRefreshToken => write!(f, "No refresh token available"),
            RefreshError::Rejected { status, message } => {
                write!(f, "Token refresh rejected ({}): {}", status, message)
            }
            RefreshError::Transport(msg) => write!(f, "Token refresh failed: {}", msg),
            RefreshError::InvalidResponse(msg) => {
                write!(f, "Token refresh returned an invalid response: {}", msg)
            }
            RefreshError::QueueFull => write!(f, "Too many requests waiting for token refresh"),
            RefreshError::SessionChanged => {
                write!(f, "Session changed while the token was being refreshed")
            }
            RefreshError::Interrupted => write!(f, "Token refresh was interrupted"),
        }
    }
}

impl std::error::Error for RefreshError {}
