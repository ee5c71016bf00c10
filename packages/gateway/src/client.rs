use shared::models::resources::Resource;
use std::sync::Arc;
use tracing::info;

use crate::config::GatewayConfig;
use crate::events::SessionEvents;
use crate::notifications::{Notifier, TracingNotifier};
use crate::repositories::token_repository::{FileTokenRepository, TokenRepository};
use crate::services::dispatcher::RequestDispatcher;
use crate::services::errors::gateway_errors::GatewayError;
use crate::services::refresh_coordinator::RefreshCoordinator;
use crate::services::resource_service::ResourceService;
use crate::services::session_service::SessionService;
use crate::services::token_refresher::HttpTokenRefresher;

/// Entry point for hosts: one shared HTTP client, store, and session.
#[derive(Clone)]
pub struct HannaClient {
    config: Arc<GatewayConfig>,
    store: Arc<dyn TokenRepository>,
    events: SessionEvents,
    dispatcher: Arc<RequestDispatcher>,
    session: Arc<SessionService>,
}

impl HannaClient {
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn TokenRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GatewayError> {
        let config = Arc::new(config);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let events = SessionEvents::new();
        let refresher = Arc::new(HttpTokenRefresher::new(http.clone(), config.refresh_url()));
        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            refresher,
            events.clone(),
            config.max_pending_requests,
        ));
        let dispatcher = Arc::new(RequestDispatcher::new(
            config.clone(),
            http,
            store.clone(),
            coordinator,
            notifier.clone(),
            events.clone(),
        ));
        let session = Arc::new(SessionService::new(
            config.clone(),
            dispatcher.clone(),
            store.clone(),
            notifier,
            events.clone(),
        ));

        info!("Hanna gateway ready for {}", config.base_url);
        Ok(Self {
            config,
            store,
            events,
            dispatcher,
            session,
        })
    }

    /// File-backed store at the configured session path, notifications
    /// routed to tracing.
    pub async fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let store = Arc::new(FileTokenRepository::load(config.session_file.clone()).await);
        Self::new(config, store, Arc::new(TracingNotifier))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn TokenRepository> {
        self.store.clone()
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        self.dispatcher.clone()
    }

    pub fn session(&self) -> Arc<SessionService> {
        self.session.clone()
    }

    pub fn resources<R: Resource>(&self) -> ResourceService<R> {
        ResourceService::new(self.dispatcher.clone())
    }
}
