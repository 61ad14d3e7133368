#![allow(dead_code)]

use fg_scorecard::App;
use fg_scorecard::model::{Course, CourseCatalog};
use async_trait::async_trait;
use fg_scorecard::storage::{
    BlobStore, MemoryAuth, MemoryBlobStore, MemoryDocumentStore, StorageError,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn course(id: &str, par: &[u32]) -> Course {
    Course {
        id: id.to_string(),
        name: id.to_uppercase(),
        par: par.to_vec(),
    }
}

pub struct TestApp {
    pub app: App,
    pub documents: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

/// App on in-memory backends with the built-in course catalog.
pub fn memory_app() -> Result<TestApp, Box<dyn std::error::Error>> {
    memory_app_with_auth(Arc::new(MemoryAuth::new()))
}

pub fn memory_app_with_auth(auth: Arc<MemoryAuth>) -> Result<TestApp, Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let app = App::new(CourseCatalog::builtin()?, documents.clone(), blobs.clone(), auth);
    Ok(TestApp {
        app,
        documents,
        blobs,
    })
}

/// Blob store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_writes: AtomicBool,
}

impl FlakyBlobStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read_blob(key).await
    }

    async fn write_blob(&self, key: &str, text: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::new("disk full"));
        }
        self.inner.write_blob(key, text).await
    }
}

pub fn flaky_app() -> Result<(App, Arc<FlakyBlobStore>), Box<dyn std::error::Error>> {
    let blobs = Arc::new(FlakyBlobStore::default());
    let app = App::new(
        CourseCatalog::builtin()?,
        Arc::new(MemoryDocumentStore::new()),
        blobs.clone(),
        Arc::new(MemoryAuth::new()),
    );
    Ok((app, blobs))
}
