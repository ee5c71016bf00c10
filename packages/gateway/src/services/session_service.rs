use serde_json::json;
use shared::models::auth::requests::LoginRequest;
use shared::models::auth::responses::TokenResponse;
use shared::models::credentials::CredentialPair;
use shared::models::user::SessionUser;
use shared::services::token_service::decode_unverified;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::events::{SessionEvent, SessionEvents};
use crate::notifications::{Notification, Notifier};
use crate::repositories::token_repository::TokenRepository;
use crate::services::dispatcher::{ApiRequest, RequestDispatcher};
use crate::services::errors::session_errors::SessionError;

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Authenticated(SessionUser),
    Unauthenticated,
}

/// Owns the login/logout lifecycle and reacts to unrecoverable auth
/// failures reported by the transport layer.
pub struct SessionService {
    config: Arc<GatewayConfig>,
    dispatcher: Arc<RequestDispatcher>,
    store: Arc<dyn TokenRepository>,
    notifier: Arc<dyn Notifier>,
    events: SessionEvents,
    logging_out: AtomicBool,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Releases the logout flag even if the logout future is dropped.
struct LogoutGuard<'a>(&'a AtomicBool);

impl Drop for LogoutGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionService {
    pub fn new(
        config: Arc<GatewayConfig>,
        dispatcher: Arc<RequestDispatcher>,
        store: Arc<dyn TokenRepository>,
        notifier: Arc<dyn Notifier>,
        events: SessionEvents,
    ) -> Self {
        Self {
            config,
            dispatcher,
            store,
            notifier,
            events,
            logging_out: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    /// Restores the persisted session and starts listening for auth
    /// failures. Never touches the network.
    pub async fn init(self: &Arc<Self>) -> SessionStatus {
        let status = self.restore().await;
        self.start_listener().await;
        status
    }

    /// Stops the auth-failure listener. Auth failures already signalled
    /// are handled before this returns.
    pub async fn teardown(&self) {
        let listener = match self.listener.lock().await.take() {
            Some(listener) => listener,
            None => return,
        };
        let _ = listener.shutdown.send(());
        if let Err(e) = listener.handle.await {
            error!("Session listener ended abnormally: {}", e);
        }
        debug!("Session listener stopped");
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        self.store.user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.get().await.is_some()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn restore(&self) -> SessionStatus {
        let pair = match self.store.get().await {
            Some(pair) => pair,
            None => return SessionStatus::Unauthenticated,
        };

        match decode_unverified(&pair.access_token) {
            Ok(claims) if !claims.is_expired() => {
                let user = SessionUser::from_claims(&claims);
                info!("Restored session for {}", user.display_name());
                SessionStatus::Authenticated(user)
            }
            Ok(claims) => {
                info!(
                    "Stored access token expired at {}, clearing session",
                    claims.expires_at()
                );
                self.store.clear().await;
                SessionStatus::Unauthenticated
            }
            Err(e) => {
                warn!("Stored access token unreadable, clearing session: {}", e);
                self.store.clear().await;
                SessionStatus::Unauthenticated
            }
        }
    }

    async fn start_listener(self: &Arc<Self>) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }

        let receiver = self.events.subscribe();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let service: Weak<SessionService> = Arc::downgrade(self);
        *listener = Some(Listener {
            shutdown,
            handle: tokio::spawn(listen(service, receiver, shutdown_rx)),
        });
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<SessionUser, SessionError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SessionError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self
            .dispatcher
            .post_json(&self.config.login_path, &request)
            .await
            .map_err(|e| {
                error!("Failed to authenticate user {}: {}", request.username, e);
                SessionError::from(e)
            })?;

        let refresh = match response.refresh.filter(|token| !token.trim().is_empty()) {
            Some(refresh) => refresh,
            None => {
                error!(
                    "Login for {} returned no refresh token, abandoning session",
                    request.username
                );
                self.end_session(false, false).await;
                return Err(SessionError::MissingRefreshToken);
            }
        };

        let claims = match decode_unverified(&response.access) {
            Ok(claims) => claims,
            Err(e) => {
                error!("Login for {} returned an unreadable access token", request.username);
                self.end_session(false, false).await;
                return Err(SessionError::InvalidToken(e.to_string()));
            }
        };

        self.store
            .set(CredentialPair::new(response.access, refresh))
            .await;

        let persisted = self
            .store
            .get()
            .await
            .map_or(false, |pair| pair.has_refresh_token());
        if !persisted {
            error!("Refresh token was not persisted for {}", request.username);
            self.end_session(false, false).await;
            return Err(SessionError::MissingRefreshToken);
        }

        let user = SessionUser::from_claims(&claims);
        info!("Logged in as {}", user.display_name());
        self.events.emit(SessionEvent::LoggedIn { user: user.clone() });
        Ok(user)
    }

    /// Ends the session. With `notify_server`, the refresh token is revoked
    /// server-side first; that call is best effort.
    pub async fn logout(&self, notify_server: bool) {
        self.end_session(notify_server, false).await;
    }

    async fn handle_auth_failure(&self, reason: &str) {
        if self.store.get().await.is_none() {
            debug!("Auth failure with no active session: {}", reason);
            return;
        }

        warn!("Forcing logout: {}", reason);
        if self.end_session(false, true).await {
            self.notifier
                .notify(Notification::warning(SESSION_EXPIRED_MESSAGE));
            self.events.emit(SessionEvent::LoginRequired);
        }
    }

    /// Returns `false` when another logout was already running.
    async fn end_session(&self, notify_server: bool, forced: bool) -> bool {
        if self.logging_out.swap(true, Ordering::SeqCst) {
            debug!("Logout already in progress");
            return false;
        }
        let _guard = LogoutGuard(&self.logging_out);

        if notify_server {
            if let Some(pair) = self.store.get().await.filter(|p| p.has_refresh_token()) {
                let request = ApiRequest::post(
                    self.config.logout_path.clone(),
                    json!({ "refresh": pair.refresh_token }),
                )
                .quiet()
                .without_refresh();
                if let Err(e) = self.dispatcher.send(request).await {
                    warn!("Server-side logout failed: {}", e);
                }
            }
        }

        self.store.clear().await;
        self.events.emit(SessionEvent::LoggedOut { forced });
        info!("Session ended (forced: {})", forced);
        true
    }
}

async fn listen(
    service: Weak<SessionService>,
    mut receiver: Receiver<SessionEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            event = receiver.recv() => match event {
                Ok(event) => {
                    if !on_event(&service, event).await {
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session listener lagged, skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => return,
            },
            _ = &mut shutdown => break,
        }
    }

    // Drain what was queued before shutdown.
    loop {
        match receiver.try_recv() {
            Ok(event) => {
                if !on_event(&service, event).await {
                    return;
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Session listener lagged, skipped {} event(s)", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return,
        }
    }
}

/// Returns `false` once the session service is gone.
async fn on_event(service: &Weak<SessionService>, event: SessionEvent) -> bool {
    if let SessionEvent::AuthFailed { reason } = event {
        match service.upgrade() {
            Some(service) => service.handle_auth_failure(&reason).await,
            None => return false,
        }
    }
    true
}
