use chrono::Duration;
use shared::models::ids::ObjectId;
use shared::models::user::UserRole;
use std::env;
use std::fmt;

/// Account the development backend accepts at its token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DevUser {
    pub id: ObjectId,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Issue a new refresh token on every refresh and revoke the old one.
    pub rotate_refresh_tokens: bool,
    pub page_size: usize,
    pub users: Vec<DevUser>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "hanna-dev-secret-change-me".to_string(),
            bind_addr: "127.0.0.1:8000".to_string(),
            access_token_ttl: Duration::minutes(5),
            refresh_token_ttl: Duration::days(1),
            rotate_refresh_tokens: true,
            page_size: 20,
            users: vec![DevUser {
                id: ObjectId::Number(1),
                username: "admin".to_string(),
                password: "admin".to_string(),
                role: UserRole::Admin,
            }],
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let mut config = Self::default();

        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }

        if let Ok(bind_addr) = env::var("HANNA_BIND_ADDR") {
            config.bind_addr = bind_addr;
        }

        if let Ok(ttl) = env::var("ACCESS_TOKEN_TTL_SECS") {
            config.access_token_ttl = Duration::seconds(parse("ACCESS_TOKEN_TTL_SECS", &ttl)?);
        }

        if let Ok(ttl) = env::var("REFRESH_TOKEN_TTL_SECS") {
            config.refresh_token_ttl = Duration::seconds(parse("REFRESH_TOKEN_TTL_SECS", &ttl)?);
        }

        if let Ok(rotate) = env::var("ROTATE_REFRESH_TOKENS") {
            config.rotate_refresh_tokens = parse("ROTATE_REFRESH_TOKENS", &rotate)?;
        }

        if let Ok(page_size) = env::var("HANNA_PAGE_SIZE") {
            config.page_size = parse("HANNA_PAGE_SIZE", &page_size)?;
        }

        if let Ok(users) = env::var("HANNA_DEV_USERS") {
            config.users = parse_users(&users)?;
        }

        if config.jwt_secret.is_empty() {
            return Err(ApiConfigError::InvalidValue("JWT_SECRET".to_string()));
        }
        if config.page_size == 0 {
            return Err(ApiConfigError::InvalidValue("HANNA_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ApiConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiConfigError::InvalidValue(key.to_string()))
}

/// Parses `username:password:role` entries separated by commas. Ids are
/// assigned in order starting at 1.
pub fn parse_users(raw: &str) -> Result<Vec<DevUser>, ApiConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let parts: Vec<&str> = entry.splitn(3, ':').collect();
            let (username, password, role) = match parts.as_slice() {
                [username, password, role] => (*username, *password, *role),
                [username, password] => (*username, *password, "client"),
                _ => return Err(ApiConfigError::InvalidUser(entry.to_string())),
            };
            if username.is_empty() || password.is_empty() {
                return Err(ApiConfigError::InvalidUser(entry.to_string()));
            }
            let role = serde_json::from_value(serde_json::Value::String(role.to_lowercase()))
                .map_err(|_| ApiConfigError::InvalidUser(entry.to_string()))?;
            Ok(DevUser {
                id: ObjectId::Number(index as i64 + 1),
                username: username.to_string(),
                password: password.to_string(),
                role,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiConfigError {
    InvalidValue(String),
    InvalidUser(String),
}

impl fmt::Display for ApiConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiConfigError::InvalidValue(key) => write!(f, "Invalid value for {}", key),
            ApiConfigError::InvalidUser(entry) => write!(f, "Invalid dev user entry: {}", entry),
        }
    }
}

impl std::error::Error for ApiConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users() {
        let users = parse_users("ann:pw1:technician, bob:pw2").unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, ObjectId::Number(1));
        assert_eq!(users[0].role, UserRole::Technician);
        assert_eq!(users[1].username, "bob");
        assert_eq!(users[1].role, UserRole::Client);
    }

    #[test]
    fn test_parse_users_rejects_malformed_entries() {
        assert_eq!(
            parse_users("lonely").unwrap_err(),
            ApiConfigError::InvalidUser("lonely".to_string())
        );
        assert!(parse_users(":pw:admin").is_err());
    }

    #[test]
    fn test_role_is_case_insensitive() {
        let users = parse_users("ann:pw:ADMIN").unwrap();
        assert_eq!(users[0].password, "pw");
        assert_eq!(users[0].role, UserRole::Admin);
    }
}
