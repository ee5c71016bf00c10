use shared::models::user::SessionUser;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Authentication could not be recovered (refresh failed, or a replayed
    /// request was still unauthorized).
    AuthFailed { reason: String },
    LoggedIn { user: SessionUser },
    LoggedOut { forced: bool },
    /// The host should send the user back to its login screen.
    LoginRequired,
}

/// Broadcast hub connecting the transport layer to the session layer.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        if self.sender.send(event).is_err() {
            debug!("Session event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
