use serde::{Deserialize, Serialize};

use crate::models::credentials::CredentialPair;

/// Body returned by the login and refresh endpoints.
///
/// `refresh` is optional: the refresh endpoint only returns it when the
/// server rotates refresh tokens, and some login response shapes omit it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl TokenResponse {
    /// Builds a credential pair, falling back to `previous_refresh` when the
    /// response carries no (or an empty) refresh token.
    pub fn into_pair(self, previous_refresh: Option<&str>) -> Option<CredentialPair> {
        let refresh = self
            .refresh
            .filter(|token| !token.trim().is_empty())
            .or_else(|| previous_refresh.map(str::to_string))?;
        Some(CredentialPair::new(self.access, refresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_refresh_deserializes_as_none() {
        let response: TokenResponse = serde_json::from_str(r#"{"access":"a"}"#).unwrap();
        assert_eq!(response.access, "a");
        assert!(response.refresh.is_none());
    }

    #[test]
    fn test_into_pair_prefers_rotated_token() {
        let response = TokenResponse {
            access: "a2".to_string(),
            refresh: Some("r2".to_string()),
        };
        let pair = response.into_pair(Some("r1")).unwrap();
        assert_eq!(pair, CredentialPair::new("a2", "r2"));
    }

    #[test]
    fn test_into_pair_keeps_previous_token_without_rotation() {
        let response = TokenResponse {
            access: "a2".to_string(),
            refresh: None,
        };
        let pair = response.into_pair(Some("r1")).unwrap();
        assert_eq!(pair, CredentialPair::new("a2", "r1"));
    }

    #[test]
    fn test_into_pair_without_any_refresh_token() {
        let response = TokenResponse {
            access: "a".to_string(),
            refresh: Some(String::new()),
        };
        assert!(response.into_pair(None).is_none());
    }
}
