use api::config::{ApiConfig, DevUser};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use shared::models::auth::responses::TokenResponse;
use shared::models::ids::ObjectId;
use shared::models::user::UserRole;

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: "api-test-secret".to_string(),
        page_size: 2,
        users: vec![DevUser {
            id: ObjectId::Number(3),
            username: "mfr.nyasha".to_string(),
            password: "factory".to_string(),
            role: UserRole::Manufacturer,
        }],
        ..ApiConfig::default()
    }
}

fn test_server() -> TestServer {
    let config = test_config();
    TestServer::new(api::app(api::app_state(&config))).unwrap()
}

async fn login(server: &TestServer) -> TokenResponse {
    let response = server
        .post("/api/auth/token/")
        .json(&json!({ "username": "mfr.nyasha", "password": "factory" }))
        .await;
    response.assert_status_ok();
    response.json::<TokenResponse>()
}

#[tokio::test]
async fn test_health_check() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("Healthy!");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let server = test_server();

    let response = server
        .post("/api/auth/token/")
        .json(&json!({ "username": "mfr.nyasha", "password": "guess" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({
        "detail": "No active account found with the given credentials"
    }));
}

#[tokio::test]
async fn test_blank_username_is_field_error() {
    let server = test_server();

    let response = server
        .post("/api/auth/token/")
        .json(&json!({ "username": "", "password": "x" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "username": ["This field may not be blank."] }));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = test_server();

    let response = server.get("/api/contacts/").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({
        "detail": "Authentication credentials were not provided."
    }));

    let response = server
        .get("/api/contacts/")
        .authorization_bearer("not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "token_not_valid");
}

#[tokio::test]
async fn test_refresh_rotates_and_logout_revokes() {
    let server = test_server();
    let tokens = login(&server).await;
    let first_refresh = tokens.refresh.unwrap();

    let response = server
        .post("/api/auth/token/refresh/")
        .json(&json!({ "refresh": first_refresh }))
        .await;
    response.assert_status_ok();
    let rotated = response.json::<TokenResponse>().refresh.unwrap();

    server
        .post("/api/auth/token/refresh/")
        .json(&json!({ "refresh": first_refresh }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/auth/logout/")
        .json(&json!({ "refresh": rotated }))
        .await
        .assert_status(StatusCode::RESET_CONTENT);

    server
        .post("/api/auth/token/refresh/")
        .json(&json!({ "refresh": rotated }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let server = test_server();
    let tokens = login(&server).await;

    server
        .post("/api/auth/token/refresh/")
        .json(&json!({ "refresh": tokens.access }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_crud_round_trip() {
    let server = test_server();
    let access = login(&server).await.access;

    let created = server
        .post("/api/installations/")
        .authorization_bearer(&access)
        .json(&json!({ "customer": 12, "status": "scheduled" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_i64().unwrap();
    let item_path = format!("/api/installations/{}/", id);

    server
        .patch(&item_path)
        .authorization_bearer(&access)
        .json(&json!({ "status": "completed" }))
        .await
        .assert_json(&json!({ "id": id, "customer": 12, "status": "completed" }));

    server
        .delete(&item_path)
        .authorization_bearer(&access)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let missing = server.get(&item_path).authorization_bearer(&access).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    missing.assert_json(&json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn test_validation_errors_use_field_shape() {
    let server = test_server();
    let access = login(&server).await.access;

    let response = server
        .post("/api/contacts/")
        .authorization_bearer(&access)
        .json(&json!({ "email": "x@y.z" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "name": ["This field is required."] }));
}

#[tokio::test]
async fn test_list_is_paginated() {
    let server = test_server();
    let access = login(&server).await.access;
    for name in ["One", "Two", "Three"] {
        server
            .post("/api/flows/")
            .authorization_bearer(&access)
            .json(&json!({ "name": name }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let first = server
        .get("/api/flows/")
        .authorization_bearer(&access)
        .await
        .json::<Value>();
    assert_eq!(first["count"], 3);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert!(first["next"].as_str().unwrap().ends_with("/api/flows/?page=2"));
    assert!(first["previous"].is_null());

    let second = server
        .get("/api/flows/")
        .add_query_param("page", 2)
        .authorization_bearer(&access)
        .await
        .json::<Value>();
    assert_eq!(second["results"][0]["name"], "Three");
    assert!(second["next"].is_null());

    let huge = server
        .get("/api/flows/")
        .add_query_param("page", usize::MAX / 4)
        .authorization_bearer(&access)
        .await;
    huge.assert_status(StatusCode::NOT_FOUND);
    huge.assert_json(&json!({ "detail": "Invalid page." }));
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let server = test_server();
    let access = login(&server).await.access;

    server
        .get("/api/invoices/")
        .authorization_bearer(&access)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
