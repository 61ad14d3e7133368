use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{BlobStore, StorageError};

/// One file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_blob(&self, key: &str, text: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Readers see either the old array or the new one.
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

/// Key-value table in a sqlite file.
#[derive(Clone)]
pub struct SqliteBlobStore {
    conn: Arc<Mutex<Connection>>,
}

const CREATE_BLOBS: &str =
    "CREATE TABLE IF NOT EXISTS blobs (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL);";

impl SqliteBlobStore {
    /// # Errors
    /// Returns an error if the database cannot be opened or the table created.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(CREATE_BLOBS)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn interact<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::new("sqlite connection poisoned"))?;
            f(&guard).map_err(StorageError::from)
        })
        .await
        .map_err(|e| StorageError::new(e.to_string()))?
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.interact(move |conn| {
            conn.query_row(
                "SELECT value FROM blobs WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
        .await
    }

    async fn write_blob(&self, key: &str, text: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let text = text.to_string();
        self.interact(move |conn| {
            conn.execute(
                "INSERT INTO blobs (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, text],
            )
            .map(|_| ())
        })
        .await
    }
}
