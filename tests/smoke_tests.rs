use skasc_client::components::redis_service::RedisActorHandle;
use skasc_client::components::session::LoggingNavigator;
use skasc_client::components::storage::KeyValueStore;
use skasc_client::components::ui::TerminalSurface;
use skasc_client::config::{Config, StorageBackend};
use skasc_client::error::Error;
use skasc_client::startup::ClientContext;
use std::sync::Arc;

/// Smoke test for the Redis actor handle
#[tokio::test]
async fn test_redis_handle_without_actor() {
    // A handle whose actor never started fails calls instead of hanging
    let redis_handle = RedisActorHandle::empty();

    let err = redis_handle.get("token").await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(redis_handle.set("token", "abc").await.is_err());
    assert!(redis_handle.shutdown().await.is_ok());
}

/// The default config points at the local development server
#[tokio::test]
async fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.api_base_url, "http://localhost:5000/api");
    assert_eq!(config.login_page, "/auth/login.html");
    assert_eq!(config.storage_backend, StorageBackend::File);
    assert_eq!(config.request_timeout_secs, None);
}

/// A context over memory storage wires every piece to the same session
#[tokio::test]
async fn test_context_with_memory_storage() {
    let config = Config {
        api_base_url: "http://127.0.0.1:9/api".to_string(),
        storage_backend: StorageBackend::Memory,
        request_timeout_secs: Some(2),
        ..Config::default()
    };

    let ctx = ClientContext::build(
        config,
        Arc::new(LoggingNavigator::new()),
        Arc::new(TerminalSurface),
    )
    .await
    .unwrap();

    assert!(!ctx.session.is_authenticated().await);
    assert_eq!(ctx.api.base_url(), "http://127.0.0.1:9/api");
    assert!(Arc::ptr_eq(ctx.api.session(), &ctx.session));

    let id = ctx
        .events
        .save_event(skasc_client::components::EventRecordBuilder::new())
        .await
        .unwrap();
    assert!(ctx.events.get_event_by_id(&id).await.unwrap().is_some());

    ctx.shutdown().await.unwrap();
}

/// File storage survives a second context
#[tokio::test]
async fn test_context_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        storage_backend: StorageBackend::File,
        storage_path: dir.path().join("storage.json"),
        ..Config::default()
    };

    let ctx = ClientContext::build(
        config.clone(),
        Arc::new(LoggingNavigator::new()),
        Arc::new(TerminalSurface),
    )
    .await
    .unwrap();
    ctx.session
        .store_credentials("token-1-abc", &serde_json::json!({"id": 1}))
        .await
        .unwrap();
    ctx.shutdown().await.unwrap();

    let ctx = ClientContext::build(
        config,
        Arc::new(LoggingNavigator::new()),
        Arc::new(TerminalSurface),
    )
    .await
    .unwrap();
    assert_eq!(ctx.session.token().await.as_deref(), Some("token-1-abc"));
}
