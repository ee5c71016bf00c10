#![allow(dead_code)]

use chrono::Duration;
use gateway::{
    GatewayConfig, HannaClient, InMemoryTokenRepository, Notification, NotificationLevel,
    Notifier, SessionEvent, TokenRepository,
};
use serde_json::{json, Value};
use shared::models::credentials::CredentialPair;
use shared::models::ids::ObjectId;
use shared::models::user::UserRole;
use shared::services::token_service::{TokenService, TokenSubject};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use wiremock::MockServer;

pub const TEST_SECRET: &str = "gateway-test-secret";

/// Collects notifications so tests can assert on what the user would see.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn with_level(&self, level: NotificationLevel) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub fn subject() -> TokenSubject {
    TokenSubject {
        user_id: ObjectId::Number(42),
        username: "tech.tendai".to_string(),
        email: Some("tendai@hanna.test".to_string()),
        role: UserRole::Technician,
    }
}

pub fn token_service(access_ttl: Duration) -> TokenService {
    TokenService::new(TEST_SECRET.to_string(), access_ttl, Duration::days(1))
}

/// A fresh, decodable credential pair.
pub fn issue_pair() -> CredentialPair {
    token_service(Duration::minutes(5))
        .issue_pair(&subject())
        .unwrap()
}

pub fn issue_expired_pair() -> CredentialPair {
    token_service(Duration::seconds(-120))
        .issue_pair(&subject())
        .unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn token_body(access: &str, refresh: Option<&str>) -> Value {
    match refresh {
        Some(refresh) => json!({ "access": access, "refresh": refresh }),
        None => json!({ "access": access }),
    }
}

pub struct TestGateway {
    pub client: HannaClient,
    pub store: Arc<InMemoryTokenRepository>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn gateway_for(server: &MockServer, pair: Option<CredentialPair>) -> TestGateway {
    let store = Arc::new(match pair {
        Some(pair) => InMemoryTokenRepository::with_pair(pair),
        None => InMemoryTokenRepository::new(),
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let config = GatewayConfig::with_base_url(format!("{}/api", server.uri()));
    let client = HannaClient::new(
        config,
        store.clone() as Arc<dyn TokenRepository>,
        notifier.clone(),
    )
    .unwrap();

    TestGateway {
        client,
        store,
        notifier,
    }
}

/// Drains whatever is already queued on `receiver`.
pub async fn drain(receiver: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
