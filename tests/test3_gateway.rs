mod common;

use common::course;
use fg_scorecard::CoreError;
use fg_scorecard::model::{RoundRecord, SavedRound, ScoreStore};
use fg_scorecard::storage::{
    AuthService, AuthSession, BlobStore, FileBlobStore, LOCAL_ROUNDS_KEY, MemoryAuth,
    MemoryBlobStore, MemoryDocumentStore, RoundGateway, SessionContext, SqliteBlobStore,
};
use std::sync::Arc;
use std::time::Duration;

fn played_round() -> Result<RoundRecord, CoreError> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3, 4]));
    store.add_player("Ann")?;
    store.set_score("Ann", 0, "3")?;
    store.set_score("Ann", 1, "5")?;
    store.snapshot(None, "2.6.2024 9.05.00".into())
}

fn session(uid: &str) -> AuthSession {
    AuthSession {
        user_id: uid.into(),
        email: format!("{uid}@example.com"),
        id_token: format!("token-{uid}"),
        refresh_token: format!("refresh-{uid}"),
        expires_at: None,
    }
}

async fn local_round_trip(blobs: Arc<dyn BlobStore>) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = RoundGateway::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::clone(&blobs),
        SessionContext::new(),
    );
    let record = played_round()?;

    let saved = gateway.save(record.clone()).await?;
    assert_eq!(saved, SavedRound::Local(record.clone()));
    gateway.save(record.clone()).await?;

    let listed = gateway.list().await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].record(), &record);
    // hole 3 was never scored
    assert_eq!(listed[0].record().entries_for("Ann").len(), 2);

    gateway.delete(&listed[0]).await?;
    assert_eq!(gateway.list().await?.len(), 1);

    let raw = blobs.read_blob(LOCAL_ROUNDS_KEY).await?.ok_or("no blob")?;
    assert!(raw.contains("\"diffToPar\":2"));
    assert!(!raw.contains("userId\":\""));
    Ok(())
}

#[tokio::test]
async fn test3_local_round_trip_memory() -> Result<(), Box<dyn std::error::Error>> {
    local_round_trip(Arc::new(MemoryBlobStore::new())).await
}

#[tokio::test]
async fn test3_local_round_trip_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    local_round_trip(Arc::new(FileBlobStore::new(dir.path().join("data")))).await?;

    // A second store on the same directory sees what the first one wrote.
    let reopened = FileBlobStore::new(dir.path().join("data"));
    assert!(reopened.read_blob(LOCAL_ROUNDS_KEY).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test3_local_round_trip_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rounds.sqlite");
    local_round_trip(Arc::new(SqliteBlobStore::open(&path)?)).await?;

    let reopened = SqliteBlobStore::open(&path)?;
    let raw = reopened.read_blob(LOCAL_ROUNDS_KEY).await?.ok_or("no blob")?;
    let rounds: Vec<RoundRecord> = serde_json::from_str(&raw)?;
    assert_eq!(rounds.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test3_reads_lists_written_by_earlier_releases() -> Result<(), Box<dyn std::error::Error>> {
    let blobs = Arc::new(MemoryBlobStore::new());
    let stored = r#"[{"date":"1.5.2023 18.00.00","course":"Laajavuori","par":[3,4],
        "players":["Ann"],"scores":{"Ann":[{"hole":1,"diffToPar":-1,"obCount":0}]}}]"#;
    blobs.write_blob(LOCAL_ROUNDS_KEY, stored).await?;
    let gateway = RoundGateway::new(
        Arc::new(MemoryDocumentStore::new()),
        blobs,
        SessionContext::new(),
    );

    let listed = gateway.list().await?;
    assert_eq!(listed.len(), 1);
    let record = listed[0].record();
    assert_eq!(record.course, "Laajavuori");
    assert_eq!(record.user_id, None);
    assert_eq!(record.entries_for("Ann")[0].diff_to_par, -1);
    Ok(())
}

#[tokio::test]
async fn test3_session_picks_the_backend() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let context = SessionContext::new();
    let gateway = RoundGateway::new(documents.clone(), blobs.clone(), context.clone());

    gateway.save(played_round()?).await?;
    assert!(documents.is_empty().await);

    context.set(Some(session("uid1")));
    assert!(gateway.list().await?.is_empty());
    let saved = gateway.save(played_round()?).await?;
    assert_eq!(saved.remote_id(), Some("doc1"));
    assert_eq!(saved.record().user_id.as_deref(), Some("uid1"));
    assert_eq!(documents.len().await, 1);

    // Another user never sees uid1's rounds.
    context.set(Some(session("uid2")));
    assert!(gateway.list().await?.is_empty());

    context.set(Some(session("uid1")));
    let listed = gateway.list().await?;
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_remote());

    context.set(None);
    let local = gateway.list().await?;
    assert_eq!(local.len(), 1);
    assert!(!local[0].is_remote());
    Ok(())
}

#[tokio::test]
async fn test3_remote_delete_needs_a_session() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let context = SessionContext::new();
    let gateway = RoundGateway::new(
        documents.clone(),
        Arc::new(MemoryBlobStore::new()),
        context.clone(),
    );
    context.set(Some(session("uid1")));
    let saved = gateway.save(played_round()?).await?;
    context.set(None);

    let err = gateway.delete(&saved).await.unwrap_err();
    assert!(matches!(err, CoreError::Precondition(_)));
    assert_eq!(documents.len().await, 1);

    context.set(Some(session("uid1")));
    gateway.delete(&saved).await?;
    assert!(documents.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test3_remote_failures_surface_backend_message() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let context = SessionContext::new();
    let gateway = RoundGateway::new(
        documents.clone(),
        Arc::new(MemoryBlobStore::new()),
        context.clone(),
    );
    context.set(Some(session("uid1")));
    documents.set_fail_creates(true);

    let err = gateway.save(played_round()?).await.unwrap_err();
    assert_eq!(
        err,
        CoreError::Storage("Missing or insufficient permissions.".into())
    );
    assert!(documents.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test3_slow_backend_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let context = SessionContext::new();
    let gateway = RoundGateway::new(
        documents.clone(),
        Arc::new(MemoryBlobStore::new()),
        context.clone(),
    )
    .with_remote_timeout(Duration::from_millis(20));
    context.set(Some(session("uid1")));
    documents.set_delay(Some(Duration::from_millis(500))).await;

    let err = gateway.list().await.unwrap_err();
    assert_eq!(err, CoreError::Timeout(Duration::from_millis(20)));
    Ok(())
}

#[tokio::test]
async fn test3_expiring_token_refreshes_before_remote_call() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let auth = Arc::new(MemoryAuth::new().with_token_lifetime(Duration::ZERO));
    let context = SessionContext::new();
    let service = AuthService::new(auth.clone(), context.clone());
    let gateway = RoundGateway::new(
        documents.clone(),
        Arc::new(MemoryBlobStore::new()),
        context.clone(),
    )
    .with_token_refresh(auth.clone());

    service.sign_up("ann@example.com", "pw").await?;
    let saved = gateway.save(played_round()?).await?;
    assert_eq!(saved.record().user_id.as_deref(), Some("uid1"));
    assert_eq!(auth.refresh_count(), 1);
    assert_eq!(documents.last_token().await.as_deref(), Some("token-uid1-refresh1"));
    let current = context.current().ok_or("signed out")?;
    assert_eq!(current.id_token, "token-uid1-refresh1");
    assert_eq!(current.email, "ann@example.com");
    Ok(())
}

#[tokio::test]
async fn test3_fresh_token_is_used_as_is() -> Result<(), Box<dyn std::error::Error>> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let auth = Arc::new(MemoryAuth::new().with_token_lifetime(Duration::from_secs(3600)));
    let context = SessionContext::new();
    let service = AuthService::new(auth.clone(), context.clone());
    let gateway = RoundGateway::new(documents.clone(), Arc::new(MemoryBlobStore::new()), context)
        .with_token_refresh(auth.clone());

    service.sign_in("ann@example.com", "pw").await.unwrap_err();
    service.sign_up("ann@example.com", "pw").await?;
    gateway.list().await?;
    assert_eq!(auth.refresh_count(), 0);
    assert_eq!(documents.last_token().await.as_deref(), Some("token-uid1"));
    Ok(())
}

#[tokio::test]
async fn test3_rejected_refresh_is_an_auth_error() -> Result<(), Box<dyn std::error::Error>> {
    let auth = Arc::new(MemoryAuth::new());
    let context = SessionContext::new();
    let gateway = RoundGateway::new(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemoryBlobStore::new()),
        context.clone(),
    )
    .with_token_refresh(auth);
    let mut stale = session("uid1");
    stale.refresh_token = String::new();
    stale.expires_at = Some(chrono::Utc::now());
    context.set(Some(stale));

    let err = gateway.list().await.unwrap_err();
    assert_eq!(err, CoreError::Auth("INVALID_REFRESH_TOKEN".into()));
    Ok(())
}

#[tokio::test]
async fn test3_slow_sign_in_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let auth = Arc::new(MemoryAuth::new());
    let context = SessionContext::new();
    let service = AuthService::new(auth.clone(), context.clone())
        .with_timeout(Duration::from_millis(20));
    service.sign_up("ann@example.com", "pw").await?;
    service.sign_out();
    auth.set_delay(Some(Duration::from_millis(500))).await;

    let err = service.sign_in("ann@example.com", "pw").await.unwrap_err();
    assert_eq!(err, CoreError::Timeout(Duration::from_millis(20)));
    assert!(!context.is_signed_in());
    Ok(())
}
