//! Authenticated request gateway for the Hanna REST API.
//!
//! [`HannaClient`] wires the pieces together: a [`TokenRepository`] holding
//! the credential pair, a [`RequestDispatcher`] that attaches bearer tokens
//! and normalises error payloads, a [`RefreshCoordinator`] that collapses
//! concurrent 401s into a single refresh call, and a [`SessionService`] that
//! owns login and logout.

pub mod client;
pub mod config;
pub mod events;
pub mod notifications;
pub mod repositories;
pub mod services;

pub use client::HannaClient;
pub use config::{ConfigError, GatewayConfig};
pub use events::{SessionEvent, SessionEvents};
pub use notifications::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use repositories::token_repository::{
    FileTokenRepository, InMemoryTokenRepository, TokenRepository,
};
pub use services::dispatcher::{ApiRequest, ApiResponse, RequestDispatcher};
pub use services::errors::{
    gateway_errors::GatewayError, refresh_errors::RefreshError, session_errors::SessionError,
};
pub use services::refresh_coordinator::RefreshCoordinator;
pub use services::resource_service::ResourceService;
pub use services::session_service::{SessionService, SessionStatus, SESSION_EXPIRED_MESSAGE};
pub use services::token_refresher::{HttpTokenRefresher, TokenRefresher};
