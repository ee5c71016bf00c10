//! Development backend speaking the Hanna REST contract: JWT login, refresh
//! with optional rotation, logout, and in-memory CRUD collections.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use config::ApiConfig;
use services::auth_service::AuthService;
use services::resource_service::ResourceService;
use state::AppState;

pub fn app_state(config: &ApiConfig) -> AppState {
    AppState {
        auth_service: Arc::new(AuthService::new(config)),
        resource_service: Arc::new(ResourceService::new(config.page_size)),
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(routes::auth::routes())
        .merge(routes::resources::routes());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
