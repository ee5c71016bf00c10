use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::credentials::CredentialPair;
use shared::models::user::SessionUser;
use shared::services::token_service::decode_unverified;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// Single owner of the credential pair.
///
/// All operations are total: a store that fails to persist keeps serving its
/// in-memory copy and logs the failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn get(&self) -> Option<CredentialPair>;
    async fn set(&self, pair: CredentialPair);
    async fn clear(&self);
    /// Identity decoded from the current access token.
    async fn user(&self) -> Option<SessionUser>;
}

/// On-disk shape: three independent keys.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
struct StoredSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<SessionUser>,
}

impl StoredSession {
    fn from_pair(pair: CredentialPair) -> Self {
        let user = match decode_unverified(&pair.access_token) {
            Ok(claims) => Some(SessionUser::from_claims(&claims)),
            Err(e) => {
                debug!("Access token claims unreadable, storing without user: {}", e);
                None
            }
        };
        StoredSession {
            access_token: Some(pair.access_token),
            refresh_token: Some(pair.refresh_token),
            user,
        }
    }

    fn pair(&self) -> Option<CredentialPair> {
        let access_token = self.access_token.clone()?;
        Some(CredentialPair::new(
            access_token,
            self.refresh_token.clone().unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    session: RwLock<Option<StoredSession>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            session: RwLock::new(Some(StoredSession::from_pair(pair))),
        }
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn get(&self) -> Option<CredentialPair> {
        self.session.read().await.as_ref().and_then(StoredSession::pair)
    }

    async fn set(&self, pair: CredentialPair) {
        *self.session.write().await = Some(StoredSession::from_pair(pair));
    }

    async fn clear(&self) {
        *self.session.write().await = None;
    }

    async fn user(&self) -> Option<SessionUser> {
        self.session.read().await.as_ref().and_then(|s| s.user.clone())
    }
}

/// JSON file store so a restarted host keeps its session.
#[derive(Debug)]
pub struct FileTokenRepository {
    path: PathBuf,
    session: RwLock<Option<StoredSession>>,
}

impl FileTokenRepository {
    /// Opens the store, loading any previously persisted session. An
    /// unreadable file starts an empty session.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoredSession>(&bytes) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", path.display(), e);
                None
            }
        };

        Self {
            path,
            session: RwLock::new(session),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, session: &StoredSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(session)?;
        let tmp_path = self.path.with_extension("json.tmp");
        write_private(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await
    }
}

#[cfg(unix)]
async fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(not(unix))]
async fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    tokio::fs::write(path, bytes).await
}

#[async_trait]
impl TokenRepository for FileTokenRepository {
    async fn get(&self) -> Option<CredentialPair> {
        self.session.read().await.as_ref().and_then(StoredSession::pair)
    }

    async fn set(&self, pair: CredentialPair) {
        let session = StoredSession::from_pair(pair);
        let mut guard = self.session.write().await;
        if let Err(e) = self.persist(&session).await {
            warn!("Failed to persist session to {}: {}", self.path.display(), e);
        }
        *guard = Some(session);
    }

    async fn clear(&self) {
        let mut guard = self.session.write().await;
        *guard = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed session file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file {}: {}", self.path.display(), e),
        }
    }

    async fn user(&self) -> Option<SessionUser> {
        self.session.read().await.as_ref().and_then(|s| s.user.clone())
    }
}
