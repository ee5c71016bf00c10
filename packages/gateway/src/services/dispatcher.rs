use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::events::{SessionEvent, SessionEvents};
use crate::notifications::{Notification, Notifier};
use crate::repositories::token_repository::TokenRepository;
use crate::services::errors::gateway_errors::GatewayError;
use crate::services::refresh_coordinator::RefreshCoordinator;

/// A request the dispatcher can replay after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Show failures to the user.
    pub notify_errors: bool,
    /// Refresh and replay on 401.
    pub allow_refresh: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            notify_errors: true,
            allow_refresh: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.notify_errors = false;
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.allow_refresh = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        serde_json::from_slice(&self.body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Sends requests with the stored bearer token and turns failures into
/// [`GatewayError`]s.
///
/// A 401 on any endpoint other than login/refresh goes through the
/// [`RefreshCoordinator`] and is replayed exactly once with the new token.
/// URLs outside the base URL never see the token.
pub struct RequestDispatcher {
    config: Arc<GatewayConfig>,
    http: reqwest::Client,
    store: Arc<dyn TokenRepository>,
    coordinator: Arc<RefreshCoordinator>,
    notifier: Arc<dyn Notifier>,
    events: SessionEvents,
}

impl RequestDispatcher {
    pub fn new(
        config: Arc<GatewayConfig>,
        http: reqwest::Client,
        store: Arc<dyn TokenRepository>,
        coordinator: Arc<RefreshCoordinator>,
        notifier: Arc<dyn Notifier>,
        events: SessionEvents,
    ) -> Self {
        Self {
            config,
            http,
            store,
            coordinator,
            notifier,
            events,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let url = self.config.url_for(&request.path);
        let authorized = self.config.is_api_url(&url) && !self.config.is_auth_endpoint(&url);

        let access_token = if !authorized {
            None
        } else {
            self.store.get().await.map(|pair| pair.access_token)
        };

        let response = match self.execute(&request, &url, access_token.as_deref()).await {
            Ok(response) => response,
            Err(err) => return Err(self.surface(&request, err)),
        };

        if response.status != 401 || !authorized || !request.allow_refresh {
            return self.finish(&request, response);
        }

        debug!("{} {} returned 401, refreshing access token", request.method, url);
        let fresh_token = self
            .coordinator
            .refresh(access_token.as_deref())
            .await
            .map_err(GatewayError::from)?;

        let replay = match self.execute(&request, &url, Some(&fresh_token)).await {
            Ok(response) => response,
            Err(err) => return Err(self.surface(&request, err)),
        };

        if replay.status == 401 {
            warn!("{} {} still unauthorized after token refresh", request.method, url);
            self.events.emit(SessionEvent::AuthFailed {
                reason: format!("{} {} rejected a freshly refreshed token", request.method, url),
            });
            return Err(GatewayError::SessionExpired);
        }

        self.finish(&request, replay)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path, to_value(body)?)).await?.json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path, to_value(body)?)).await?.json()
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path, to_value(body)?)).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    async fn execute(
        &self,
        request: &ApiRequest,
        url: &str,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, GatewayError> {
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .to_vec();

        debug!("{} {} -> {}", request.method, url, status);
        Ok(ApiResponse { status, body })
    }

    fn finish(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, GatewayError> {
        if response.is_success() {
            return Ok(response);
        }
        let err = GatewayError::Http {
            status: response.status,
            message: extract_error_message(response.status, &response.body),
        };
        Err(self.surface(request, err))
    }

    /// 401s stay silent; the refresh flow or the session layer owns them.
    fn surface(&self, request: &ApiRequest, err: GatewayError) -> GatewayError {
        if request.notify_errors && err.status() != Some(401) {
            self.notifier.notify(Notification::error(err.to_string()));
        }
        err
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, GatewayError> {
    serde_json::to_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Builds a display message from an error response body.
///
/// Preference order: a `detail` field, then every field error flattened as
/// `"field: message; field2: message2"`, then a bare JSON string body, then a
/// generic status message.
pub fn extract_error_message(status: u16, body: &[u8]) -> String {
    let fallback = || format!("Request failed with status code {}", status);

    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(_) => return fallback(),
    };

    match value {
        Value::Object(fields) => {
            if let Some(detail) = fields.get("detail").and_then(message_text) {
                return detail;
            }
            let parts: Vec<String> = fields
                .iter()
                .filter_map(|(field, value)| {
                    message_text(value).map(|text| format!("{}: {}", field, text))
                })
                .collect();
            if parts.is_empty() {
                fallback()
            } else {
                parts.join("; ")
            }
        }
        Value::String(text) if !text.trim().is_empty() => text,
        _ => fallback(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::String(_) | Value::Null => None,
        Value::Array(items) => {
            let texts: Vec<String> = items.iter().filter_map(message_text).collect();
            (!texts.is_empty()).then(|| texts.join(", "))
        }
        Value::Object(fields) => {
            let texts: Vec<String> = fields
                .iter()
                .filter_map(|(field, value)| {
                    message_text(value).map(|text| format!("{}: {}", field, text))
                })
                .collect();
            (!texts.is_empty()).then(|| texts.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"detail": "Not found."}"#, "Not found.")]
    #[case(
        r#"{"email": ["Enter a valid email address."], "name": ["This field is required."]}"#,
        "email: Enter a valid email address.; name: This field is required."
    )]
    #[case(
        r#"{"password": ["Too short.", "Too common."]}"#,
        "password: Too short., Too common."
    )]
    #[case(r#"{"detail": "Not found.", "code": "not_found"}"#, "Not found.")]
    #[case(r#""Service unavailable""#, "Service unavailable")]
    #[case(
        r#"{"address": {"city": ["Required."]}}"#,
        "address: city: Required."
    )]
    #[case("<html>502 Bad Gateway</html>", "Request failed with status code 502")]
    #[case("", "Request failed with status code 502")]
    #[case(r#"{}"#, "Request failed with status code 502")]
    fn test_error_message_extraction(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(extract_error_message(502, body.as_bytes()), expected);
    }

    #[test]
    fn test_field_order_follows_response() {
        let body = r#"{"zeta": "last?", "alpha": "first?"}"#;
        assert_eq!(
            extract_error_message(400, body.as_bytes()),
            "zeta: last?; alpha: first?"
        );
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("contacts/")
            .with_query("page", 2)
            .with_query("search", "tariro")
            .quiet();

        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "tariro".to_string())
            ]
        );
        assert!(!request.notify_errors);
        assert!(request.allow_refresh);
        assert!(!ApiRequest::delete("x/").without_refresh().allow_refresh);
    }

    #[test]
    fn test_response_json_decode_error() {
        let response = ApiResponse {
            status: 200,
            body: b"not json".to_vec(),
        };
        assert!(matches!(
            response.json::<Value>(),
            Err(GatewayError::Decode(_))
        ));
    }
}
