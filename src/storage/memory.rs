//! In-process backends. Used for `--offline` runs and throughout the tests.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{AuthProvider, AuthSession, BlobStore, DocumentStore, StorageError};
use crate::model::RoundRecord;

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn write_blob(&self, key: &str, text: &str) -> Result<(), StorageError> {
        self.blobs
            .write()
            .await
            .insert(key.to_string(), text.to_string());
        Ok(())
    }
}

/// Document store with switches for simulating backend trouble.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<Vec<(String, String, RoundRecord)>>,
    next_id: AtomicU64,
    fail_creates: AtomicBool,
    fail_deletes: AtomicBool,
    delay: RwLock<Option<Duration>>,
    last_token: RwLock<Option<String>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Every call sleeps this long before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of documents across all collections.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// The id token presented with the most recent call.
    pub async fn last_token(&self) -> Option<String> {
        self.last_token.read().await.clone()
    }

    async fn seen(&self, session: &AuthSession) {
        *self.last_token.write().await = Some(session.id_token.clone());
    }

    async fn wait(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(
        &self,
        session: &AuthSession,
        collection: &str,
        record: &RoundRecord,
    ) -> Result<String, StorageError> {
        self.seen(session).await;
        self.wait().await;
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StorageError::new("Missing or insufficient permissions."));
        }
        let id = format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.docs
            .write()
            .await
            .push((collection.to_string(), id.clone(), record.clone()));
        Ok(id)
    }

    async fn query_by_owner(
        &self,
        session: &AuthSession,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<(String, RoundRecord)>, StorageError> {
        self.seen(session).await;
        self.wait().await;
        Ok(self
            .docs
            .read()
            .await
            .iter()
            .filter(|(c, _, r)| c == collection && r.user_id.as_deref() == Some(owner_id))
            .map(|(_, id, r)| (id.clone(), r.clone()))
            .collect())
    }

    async fn delete_by_id(
        &self,
        session: &AuthSession,
        collection: &str,
        id: &str,
    ) -> Result<(), StorageError> {
        self.seen(session).await;
        self.wait().await;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::new("Failed to get document because the client is offline."));
        }
        self.docs
            .write()
            .await
            .retain(|(c, doc_id, _)| !(c == collection && doc_id == id));
        Ok(())
    }
}

/// Account backend keyed by email. Sessions never expire unless a token
/// lifetime is set.
#[derive(Default)]
pub struct MemoryAuth {
    accounts: RwLock<HashMap<String, (String, String)>>,
    next_uid: AtomicU64,
    refreshes: AtomicU64,
    lifetime: Option<Duration>,
    delay: RwLock<Option<Duration>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Every sign-up and sign-in sleeps this long before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of successful token refreshes.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn session_for(&self, uid: &str, email: &str, id_token: String) -> AuthSession {
        let expires_at = self
            .lifetime
            .and_then(|l| TimeDelta::from_std(l).ok())
            .and_then(|l| Utc::now().checked_add_signed(l));
        AuthSession {
            user_id: uid.to_string(),
            email: email.to_string(),
            id_token,
            refresh_token: format!("refresh-{uid}"),
            expires_at,
        }
    }

    async fn wait(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, StorageError> {
        self.wait().await;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(StorageError::new("EMAIL_EXISTS"));
        }
        let uid = format!("uid{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        Ok(self.session_for(&uid, email, format!("token-{uid}")))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StorageError> {
        self.wait().await;
        match self.accounts.read().await.get(email) {
            Some((stored, uid)) if stored == password => {
                Ok(self.session_for(uid, email, format!("token-{uid}")))
            }
            _ => Err(StorageError::new("INVALID_LOGIN_CREDENTIALS")),
        }
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, StorageError> {
        if session.refresh_token != format!("refresh-{}", session.user_id) {
            return Err(StorageError::new("INVALID_REFRESH_TOKEN"));
        }
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        let uid = &session.user_id;
        Ok(self.session_for(uid, &session.email, format!("token-{uid}-refresh{n}")))
    }
}
