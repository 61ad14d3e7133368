use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::gateway::DEFAULT_REMOTE_TIMEOUT;
use super::{AuthProvider, StorageError};
use crate::error::CoreError;

/// Id tokens are refreshed once they are this close to expiry.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    /// `None` for tokens that never expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Whether the id token expires within the refresh margin of `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| now + TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) >= at)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// The signed-in user, if any, shared by everything that needs to know.
///
/// Cloning yields another handle onto the same session.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Option<AuthSession>>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver that wakes on every sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.tx.subscribe()
    }

    pub fn set(&self, session: Option<AuthSession>) {
        self.tx.send_replace(session);
    }
}

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    session: SessionContext,
    timeout: Duration,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>, session: SessionContext) -> Self {
        Self {
            provider,
            session,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// # Errors
    /// `CoreError::Auth` with the backend's message, or `Timeout`.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, CoreError> {
        let session = self.bounded(self.provider.sign_up(email, password)).await?;
        info!(user = %session.email, "signed up");
        self.session.set(Some(session.clone()));
        Ok(session)
    }

    /// # Errors
    /// `CoreError::Auth` with the backend's message, or `Timeout`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CoreError> {
        let session = self.bounded(self.provider.sign_in(email, password)).await?;
        info!(user = %session.email, "signed in");
        self.session.set(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_out(&self) {
        if let Some(session) = self.session.current() {
            info!(user = %session.email, "signed out");
        }
        self.session.set(None);
    }

    async fn bounded<F>(&self, fut: F) -> Result<AuthSession, CoreError>
    where
        F: Future<Output = Result<AuthSession, StorageError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| CoreError::Auth(e.to_string())),
            Err(_) => {
                warn!(timeout = ?self.timeout, "auth call timed out");
                Err(CoreError::Timeout(self.timeout))
            }
        }
    }
}
