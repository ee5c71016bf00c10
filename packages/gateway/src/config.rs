use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration for the request gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Token endpoint, relative to `base_url`.
    pub login_path: String,
    /// Refresh endpoint, relative to `base_url`.
    pub refresh_path: String,
    /// Endpoint that revokes a refresh token on logout.
    pub logout_path: String,
    /// Where the file token store persists the session.
    pub session_file: PathBuf,
    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    /// Upper bound on requests waiting for an in-flight refresh.
    pub max_pending_requests: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: "auth/token/".to_string(),
            refresh_path: "auth/token/refresh/".to_string(),
            logout_path: "auth/logout/".to_string(),
            session_file: default_session_file(),
            request_timeout: None,
            max_pending_requests: 256,
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            ..Self::default()
        }
    }

    /// Reads `HANNA_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("HANNA_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = trim_base(base_url);
        }

        if let Some(login_path) = lookup("HANNA_LOGIN_PATH") {
            config.login_path = login_path;
        }

        if let Some(refresh_path) = lookup("HANNA_REFRESH_PATH") {
            config.refresh_path = refresh_path;
        }

        if let Some(logout_path) = lookup("HANNA_LOGOUT_PATH") {
            config.logout_path = logout_path;
        }

        if let Some(session_file) = lookup("HANNA_SESSION_FILE") {
            config.session_file = PathBuf::from(session_file);
        }

        if let Some(timeout_secs) = lookup("HANNA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_number("HANNA_REQUEST_TIMEOUT_SECS", &timeout_secs)?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(max_pending) = lookup("HANNA_MAX_PENDING_REQUESTS") {
            config.max_pending_requests = parse_number("HANNA_MAX_PENDING_REQUESTS", &max_pending)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "HANNA_API_BASE_URL".to_string(),
                value: self.base_url.clone(),
            });
        }
        if self.max_pending_requests == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HANNA_MAX_PENDING_REQUESTS".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Resolves a request path against the base URL. Absolute URLs (such as
    /// pagination `next` links) pass through untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn login_url(&self) -> String {
        self.url_for(&self.login_path)
    }

    pub fn refresh_url(&self) -> String {
        self.url_for(&self.refresh_path)
    }

    pub fn logout_url(&self) -> String {
        self.url_for(&self.logout_path)
    }

    /// Whether `url` lives under the base URL. Only these get a bearer token.
    pub fn is_api_url(&self, url: &str) -> bool {
        match url.strip_prefix(&self.base_url) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// Login and refresh never go through the refresh-and-replay path.
    pub fn is_auth_endpoint(&self, url: &str) -> bool {
        let url = url.split('?').next().unwrap_or(url);
        url == self.login_url() || url == self.refresh_url()
    }
}

fn trim_base(base_url: String) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn default_session_file() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".hanna").join("session.json"),
        None => PathBuf::from(".hanna-session.json"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
