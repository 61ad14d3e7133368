use crate::model::RoundRecord;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

pub mod firebase_auth;
pub mod firestore;
pub mod firestore_codec;
pub mod gateway;
pub mod local;
pub mod memory;
pub mod session;

pub use firebase_auth::FirebaseAuth;
pub use firestore::FirestoreStore;
pub use gateway::{LOCAL_ROUNDS_KEY, ROUNDS_COLLECTION, RoundGateway};
pub use local::{FileBlobStore, SqliteBlobStore};
pub use memory::{MemoryAuth, MemoryBlobStore, MemoryDocumentStore};
pub use session::{AuthService, AuthSession, SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StorageError {}

impl From<String> for StorageError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for StorageError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(value.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// A remote collection of round documents, scoped by owner.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a document and returns the identifier the backend assigned.
    async fn create(
        &self,
        session: &AuthSession,
        collection: &str,
        record: &RoundRecord,
    ) -> Result<String, StorageError>;
    async fn query_by_owner(
        &self,
        session: &AuthSession,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<(String, RoundRecord)>, StorageError>;
    async fn delete_by_id(
        &self,
        session: &AuthSession,
        collection: &str,
        id: &str,
    ) -> Result<(), StorageError>;
}

/// Device-local durable key-value text storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn write_blob(&self, key: &str, text: &str) -> Result<(), StorageError>;
}

/// Email/password account backend. Errors carry the backend's own message.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, StorageError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StorageError>;
    /// Trades the session's refresh token for a new id token.
    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, StorageError>;
}
