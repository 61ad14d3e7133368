use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::args::{AppConfig, LocalStoreKind};
use crate::model::CourseCatalog;
use crate::mvu::{Deps, Msg, ScorecardModel, dispatch, sync_session};
use crate::storage::{
    AuthProvider, AuthService, AuthSession, BlobStore, DocumentStore, FileBlobStore,
    FirebaseAuth, FirestoreStore, MemoryAuth, MemoryBlobStore, MemoryDocumentStore,
    RoundGateway, SessionContext, SqliteBlobStore,
};

/// Everything one scorekeeping session needs, wired together.
pub struct App {
    pub catalog: CourseCatalog,
    pub gateway: RoundGateway,
    pub auth: AuthService,
    pub model: ScorecardModel,
    session_rx: watch::Receiver<Option<AuthSession>>,
}

impl App {
    #[must_use]
    pub fn new(
        catalog: CourseCatalog,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let session = SessionContext::new();
        let session_rx = session.subscribe();
        Self {
            catalog,
            gateway: RoundGateway::new(documents, blobs, session.clone())
                .with_token_refresh(Arc::clone(&auth)),
            auth: AuthService::new(auth, session),
            model: ScorecardModel::new(),
            session_rx,
        }
    }

    /// # Errors
    /// Returns an error if the catalog or the local store cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = match config.courses_json.as_deref() {
            Some(path) => CourseCatalog::from_path(path)?,
            None => CourseCatalog::builtin()?,
        };

        let blobs: Arc<dyn BlobStore> = match config.local_store {
            LocalStoreKind::File => Arc::new(FileBlobStore::new(&config.local_path)),
            LocalStoreKind::Sqlite => Arc::new(
                SqliteBlobStore::open(&config.local_path)
                    .with_context(|| format!("open {}", config.local_path.display()))?,
            ),
            LocalStoreKind::Memory => Arc::new(MemoryBlobStore::new()),
        };

        let (documents, auth): (Arc<dyn DocumentStore>, Arc<dyn AuthProvider>) =
            match &config.firebase {
                Some(fb) => {
                    info!(project = %fb.project_id, "using firebase backend");
                    (
                        Arc::new(FirestoreStore::new(&fb.project_id)),
                        Arc::new(FirebaseAuth::new(&fb.api_key)),
                    )
                }
                None => {
                    warn!("no firebase api key; accounts and cloud rounds last for this run only");
                    (Arc::new(MemoryDocumentStore::new()), Arc::new(MemoryAuth::new()))
                }
            };

        let mut app = Self::new(catalog, documents, blobs, auth);
        app.gateway = app.gateway.with_remote_timeout(config.remote_timeout);
        app.auth = app.auth.with_timeout(config.remote_timeout);
        Ok(app)
    }

    pub async fn send(&mut self, msg: Msg) {
        let deps = Deps {
            gateway: &self.gateway,
        };
        dispatch(&mut self.model, msg, deps).await;
    }

    /// Picks up sign-in / sign-out since the last call and reloads history if needed.
    pub async fn follow_session(&mut self) -> bool {
        let deps = Deps {
            gateway: &self.gateway,
        };
        sync_session(&mut self.model, &mut self.session_rx, deps).await
    }
}
