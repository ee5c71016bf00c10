use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::events::{SessionEvent, SessionEvents};
use crate::repositories::token_repository::TokenRepository;
use crate::services::errors::refresh_errors::RefreshError;
use crate::services::token_refresher::TokenRefresher;

type RefreshOutcome = Result<String, RefreshError>;

enum RefreshState {
    Idle,
    /// A refresh call is in flight; each sender is a caller waiting on it.
    Refreshing(Vec<oneshot::Sender<RefreshOutcome>>),
}

/// Serialises token refreshes so that at most one refresh call is in flight.
///
/// The first caller that observes a 401 moves the coordinator to
/// `Refreshing` and starts the refresh on a spawned task; later callers queue
/// behind it. Every queued caller receives the same outcome: the new access
/// token, or the same [`RefreshError`].
pub struct RefreshCoordinator {
    store: Arc<dyn TokenRepository>,
    refresher: Arc<dyn TokenRefresher>,
    events: SessionEvents,
    max_pending: usize,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn TokenRepository>,
        refresher: Arc<dyn TokenRefresher>,
        events: SessionEvents,
        max_pending: usize,
    ) -> Self {
        Self {
            store,
            refresher,
            events,
            max_pending: max_pending.max(1),
            state: Mutex::new(RefreshState::Idle),
        }
    }

    pub async fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock().await, RefreshState::Refreshing(_))
    }

    /// Returns an access token that is newer than `stale_token`, refreshing
    /// if necessary.
    ///
    /// `stale_token` is the token the failed request was sent with. When the
    /// store already holds a different access token, a refresh has completed
    /// since that request went out and the current token is returned without
    /// another refresh call.
    pub async fn refresh(self: &Arc<Self>, stale_token: Option<&str>) -> RefreshOutcome {
        let receiver = {
            let mut state = self.state.lock().await;
            match &mut *state {
                RefreshState::Refreshing(waiters) => {
                    if waiters.len() >= self.max_pending {
                        warn!(
                            "Refresh queue full ({} waiting), rejecting request",
                            waiters.len()
                        );
                        return Err(RefreshError::QueueFull);
                    }
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    debug!("Refresh in flight, queued request ({} waiting)", waiters.len());
                    receiver
                }
                RefreshState::Idle => {
                    if let Some(current) = self.store.get().await.map(|pair| pair.access_token) {
                        if stale_token != Some(current.as_str()) {
                            debug!("Access token already replaced, replaying without refresh");
                            return Ok(current);
                        }
                    }

                    let (sender, receiver) = oneshot::channel();
                    *state = RefreshState::Refreshing(vec![sender]);
                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move { coordinator.run_refresh().await });
                    receiver
                }
            }
        };

        receiver.await.unwrap_or(Err(RefreshError::Interrupted))
    }

    async fn run_refresh(&self) {
        let outcome = self.perform_refresh().await;

        let waiters = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing(waiters) => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };

        match &outcome {
            Ok(_) => info!("Access token refreshed, releasing {} request(s)", waiters.len()),
            Err(err) => {
                warn!(
                    "Token refresh failed, rejecting {} request(s): {}",
                    waiters.len(),
                    err
                );
                if err.is_terminal() {
                    self.events.emit(SessionEvent::AuthFailed {
                        reason: err.to_string(),
                    });
                }
            }
        }

        for waiter in waiters {
            // The waiter may have been dropped; nothing to deliver then.
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn perform_refresh(&self) -> RefreshOutcome {
        let current = self
            .store
            .get()
            .await
            .filter(|pair| pair.has_refresh_token())
            .ok_or(RefreshError::MissingRefreshToken)?;

        let response = self.refresher.refresh(&current.refresh_token).await?;
        let rotated = response.refresh.is_some();
        let next = response
            .into_pair(Some(&current.refresh_token))
            .ok_or(RefreshError::MissingRefreshToken)?;

        // A logout or a new login while the call was in flight wins.
        let still_current = self
            .store
            .get()
            .await
            .map_or(false, |pair| pair.refresh_token == current.refresh_token);
        if !still_current {
            return Err(RefreshError::SessionChanged);
        }

        debug!("Storing refreshed credentials (refresh token rotated: {})", rotated);
        let access_token = next.access_token.clone();
        self.store.set(next).await;
        Ok(access_token)
    }
}
