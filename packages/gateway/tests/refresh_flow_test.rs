pub mod common;

use common::*;
use gateway::{GatewayError, NotificationLevel, RefreshError, SessionEvent, TokenRepository};
use serde_json::json;
use shared::models::resources::contact::Contact;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTACTS: &str = "/api/contacts/";
const REFRESH: &str = "/api/auth/token/refresh/";

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    }))
}

/// Concurrent 401s share a single refresh call and every request is
/// replayed with the new token.
#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    let stale = issue_pair();
    let fresh = issue_pair();

    Mock::given(method("GET"))
        .and(path(CONTACTS))
        .and(header("Authorization", bearer(&stale.access_token).as_str()))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CONTACTS))
        .and(header("Authorization", bearer(&fresh.access_token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Tariro" }
        ])))
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({ "refresh": stale.refresh_token })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body(&fresh.access_token, Some(&fresh.refresh_token)))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some(stale));
    let contacts = gateway.client.resources::<Contact>();

    let (a, b, c, d, e) = tokio::join!(
        contacts.list(None),
        contacts.list(None),
        contacts.list(None),
        contacts.list(None),
        contacts.list(None),
    );

    for result in [a, b, c, d, e] {
        let page = result.expect("request should succeed after refresh");
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "Tariro");
    }

    assert_eq!(gateway.store.get().await, Some(fresh));
    assert!(
        gateway.notifier.all().is_empty(),
        "recovered 401s must not be shown to the user"
    );
}

/// A rejected refresh fails every waiting request with the same error and
/// forces exactly one logout.
#[tokio::test]
async fn test_failed_refresh_fails_all_waiters_and_logs_out_once() {
    let server = MockServer::start().await;
    let stale = issue_pair();

    Mock::given(method("GET"))
        .and(path(CONTACTS))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Token is blacklisted" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some(stale));
    let session = gateway.client.session();
    session.init().await;
    let mut events = session.subscribe();
    let contacts = gateway.client.resources::<Contact>();

    let (a, b, c) = tokio::join!(contacts.list(None), contacts.list(None), contacts.list(None));

    let expected = GatewayError::Refresh(RefreshError::Rejected {
        status: 401,
        message: "Token is blacklisted".to_string(),
    });
    for result in [a, b, c] {
        assert_eq!(result.unwrap_err(), expected);
    }

    let seen = drain(&mut events).await;
    let auth_failed = seen
        .iter()
        .filter(|e| matches!(e, SessionEvent::AuthFailed { .. }))
        .count();
    let forced_logouts = seen
        .iter()
        .filter(|e| matches!(e, SessionEvent::LoggedOut { forced: true }))
        .count();
    let login_required = seen
        .iter()
        .filter(|e| matches!(e, SessionEvent::LoginRequired))
        .count();
    assert_eq!(auth_failed, 1);
    assert_eq!(forced_logouts, 1);
    assert_eq!(login_required, 1);

    assert!(gateway.store.get().await.is_none());
    assert_eq!(
        gateway.notifier.with_level(NotificationLevel::Warning),
        vec!["Your session has expired. Please log in again.".to_string()]
    );
    assert!(gateway.notifier.with_level(NotificationLevel::Error).is_empty());
    session.teardown().await;
}

/// A request that is still unauthorized after a successful refresh is not
/// retried again.
#[tokio::test]
async fn test_replayed_request_is_not_retried_twice() {
    let server = MockServer::start().await;
    let stale = issue_pair();
    let fresh = issue_pair();

    Mock::given(method("GET"))
        .and(path("/api/job-cards/7/"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body(&fresh.access_token, None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some(stale.clone()));
    let mut events = gateway.client.events().subscribe();

    let result = gateway
        .client
        .dispatcher()
        .get_json::<serde_json::Value>("job-cards/7/")
        .await;

    assert_eq!(result.unwrap_err(), GatewayError::SessionExpired);
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::AuthFailed { .. }
    ));

    // Non-rotating refresh keeps the original refresh token.
    let stored = gateway.store.get().await.unwrap();
    assert_eq!(stored.access_token, fresh.access_token);
    assert_eq!(stored.refresh_token, stale.refresh_token);
}

/// Without a refresh token the original 401 ends the session; no refresh
/// call is attempted.
#[tokio::test]
async fn test_missing_refresh_token_skips_refresh_call() {
    let server = MockServer::start().await;
    let mut pair = issue_pair();
    pair.refresh_token = String::new();

    Mock::given(method("GET"))
        .and(path(CONTACTS))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some(pair));
    let result = gateway.client.resources::<Contact>().list(None).await;

    assert_eq!(
        result.unwrap_err(),
        GatewayError::Refresh(RefreshError::MissingRefreshToken)
    );
}
