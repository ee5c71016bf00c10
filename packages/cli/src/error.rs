use gateway::{ConfigError, GatewayError, SessionError};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// Already shown to the user through the notifier.
    Reported,
    Message(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::Reported => write!(f, "Request failed"),
            CliError::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<GatewayError> for CliError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(_) => CliError::Reported,
            GatewayError::Http { status, .. } if status != 401 => CliError::Reported,
            other => CliError::Message(other.to_string()),
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Gateway(err) => CliError::from(err),
            other => CliError::Message(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Message(err.to_string())
    }
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        CliError::Message(msg)
    }
}
