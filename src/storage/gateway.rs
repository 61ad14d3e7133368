use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{AuthProvider, AuthSession, BlobStore, DocumentStore, SessionContext, StorageError};
use crate::error::CoreError;
use crate::model::{RoundRecord, SavedRound};

/// Key the whole local round list lives under. Shared with earlier releases.
pub const LOCAL_ROUNDS_KEY: &str = "fgScores4";
pub const ROUNDS_COLLECTION: &str = "rounds";
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Saves, lists and deletes rounds on whichever backend the session selects:
/// the document store while signed in, local blob storage otherwise.
///
/// Rounds never move between backends.
#[derive(Clone)]
pub struct RoundGateway {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    session: SessionContext,
    remote_timeout: Duration,
    refresher: Option<Arc<dyn AuthProvider>>,
}

impl RoundGateway {
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        session: SessionContext,
    ) -> Self {
        Self {
            documents,
            blobs,
            session,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            refresher: None,
        }
    }

    /// Near-expiry id tokens are renewed through `provider` before remote calls.
    #[must_use]
    pub fn with_token_refresh(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.refresher = Some(provider);
        self
    }

    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Stamps the owner (or clears it for local rounds) and stores the round.
    ///
    /// # Errors
    /// Backend failures, timeouts, or a corrupt local list.
    pub async fn save(&self, mut record: RoundRecord) -> Result<SavedRound, CoreError> {
        match self.live_session().await? {
            Some(session) => {
                record.user_id = Some(session.user_id.clone());
                let id = self
                    .remote(self.documents.create(&session, ROUNDS_COLLECTION, &record))
                    .await?;
                info!(%id, course = %record.course, "round saved to cloud");
                Ok(SavedRound::Remote { id, record })
            }
            None => {
                record.user_id = None;
                let mut rounds = self.read_local().await?;
                rounds.push(record.clone());
                self.write_local(&rounds).await?;
                info!(course = %record.course, count = rounds.len(), "round saved locally");
                Ok(SavedRound::Local(record))
            }
        }
    }

    /// Every round visible to the current session.
    ///
    /// # Errors
    /// Backend failures, timeouts, or a corrupt local list.
    pub async fn list(&self) -> Result<Vec<SavedRound>, CoreError> {
        match self.live_session().await? {
            Some(session) => {
                let docs = self
                    .remote(self.documents.query_by_owner(
                        &session,
                        ROUNDS_COLLECTION,
                        &session.user_id,
                    ))
                    .await?;
                debug!(count = docs.len(), "listed cloud rounds");
                Ok(docs
                    .into_iter()
                    .map(|(id, record)| SavedRound::Remote { id, record })
                    .collect())
            }
            None => {
                let rounds = self.read_local().await?;
                debug!(count = rounds.len(), "listed local rounds");
                Ok(rounds.into_iter().map(SavedRound::Local).collect())
            }
        }
    }

    /// # Errors
    /// A cloud round while signed out is a `Precondition` failure; otherwise
    /// backend failures and timeouts.
    pub async fn delete(&self, round: &SavedRound) -> Result<(), CoreError> {
        match round {
            SavedRound::Remote { id, .. } => {
                let session = self.live_session().await?.ok_or_else(|| {
                    CoreError::Precondition("Sign in to delete rounds saved to the cloud.".into())
                })?;
                self.delete_remote_id(&session, id).await
            }
            SavedRound::Local(record) => {
                let mut rounds = self.read_local().await?;
                match rounds.iter().position(|r| r == record) {
                    Some(pos) => {
                        rounds.remove(pos);
                        self.write_local(&rounds).await?;
                        info!(course = %record.course, "local round deleted");
                    }
                    None => warn!(course = %record.course, "local round already gone"),
                }
                Ok(())
            }
        }
    }

    /// # Errors
    /// Backend failures and timeouts.
    pub async fn delete_remote_id(&self, session: &AuthSession, id: &str) -> Result<(), CoreError> {
        self.remote(self.documents.delete_by_id(session, ROUNDS_COLLECTION, id))
            .await?;
        info!(%id, "cloud round deleted");
        Ok(())
    }

    /// The current session, with its id token refreshed first when it is
    /// close to expiry. The refreshed session replaces the shared one.
    async fn live_session(&self) -> Result<Option<AuthSession>, CoreError> {
        let Some(session) = self.session.current() else {
            return Ok(None);
        };
        let Some(refresher) = &self.refresher else {
            return Ok(Some(session));
        };
        if !session.needs_refresh(Utc::now()) {
            return Ok(Some(session));
        }
        let refreshed = self
            .remote(refresher.refresh(&session))
            .await
            .map_err(|e| match e {
                CoreError::Storage(message) => CoreError::Auth(message),
                other => other,
            })?;
        debug!(user = %refreshed.email, "id token refreshed before remote call");
        self.session.set(Some(refreshed.clone()));
        Ok(Some(refreshed))
    }

    async fn remote<T, F>(&self, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.remote_timeout, fut).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => {
                warn!(timeout = ?self.remote_timeout, "remote call timed out");
                Err(CoreError::Timeout(self.remote_timeout))
            }
        }
    }

    async fn read_local(&self) -> Result<Vec<RoundRecord>, CoreError> {
        match self.blobs.read_blob(LOCAL_ROUNDS_KEY).await? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn write_local(&self, rounds: &[RoundRecord]) -> Result<(), CoreError> {
        let text = serde_json::to_string(rounds)?;
        self.blobs.write_blob(LOCAL_ROUNDS_KEY, &text).await?;
        Ok(())
    }
}
