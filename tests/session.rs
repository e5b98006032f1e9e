mod common;

use common::{test_session, test_session_with, LOGIN_PAGE};
use serde_json::json;
use skasc_client::components::storage::{keys, KeyValueStore, MemoryStore};

/// A token already in durable storage counts as logged in
#[tokio::test]
async fn test_load_reads_stored_token() {
    let durable = MemoryStore::new();
    durable.set(keys::TOKEN, "token-3-abc").await.unwrap();
    durable.set(keys::USER, r#"{"id":3,"name":"Arun"}"#).await.unwrap();

    let ts = test_session_with(durable).await;
    assert!(ts.session.is_authenticated().await);
    assert_eq!(ts.session.token().await.as_deref(), Some("token-3-abc"));
    assert!(ts.session.require_auth().await);
    assert_eq!(ts.navigator.last_redirect(), None);

    let user = ts.session.current_user().await.unwrap().unwrap();
    assert_eq!(user["name"], "Arun");
}

/// Without a token, protected pages bounce to the login page
#[tokio::test]
async fn test_require_auth_redirects() {
    let ts = test_session().await;

    assert!(!ts.session.is_authenticated().await);
    assert!(!ts.session.require_auth().await);
    assert_eq!(ts.navigator.last_redirect().as_deref(), Some(LOGIN_PAGE));
    assert_eq!(ts.session.current_user().await.unwrap(), None);
}

/// Logging out removes both keys and redirects
#[tokio::test]
async fn test_logout() {
    let ts = test_session().await;
    ts.session
        .store_credentials("token-1-abc", &json!({"id": 1}))
        .await
        .unwrap();
    assert_eq!(ts.durable.len().await, 2);

    ts.session.logout().await.unwrap();

    assert!(ts.durable.is_empty().await);
    assert!(!ts.session.is_authenticated().await);
    assert_eq!(ts.navigator.last_redirect().as_deref(), Some(LOGIN_PAGE));
}

/// Empty hints are treated as absent
#[tokio::test]
async fn test_event_type_hint() {
    let ts = test_session().await;
    assert_eq!(ts.session.event_type_hint().await.unwrap(), None);

    ts.session.set_event_type_hint("").await.unwrap();
    assert_eq!(ts.session.event_type_hint().await.unwrap(), None);

    ts.session.set_event_type_hint("paper_presentation").await.unwrap();
    assert_eq!(
        ts.session.event_type_hint().await.unwrap().as_deref(),
        Some("paper_presentation")
    );
    assert_eq!(
        ts.transient.get(keys::EVENT_TYPE).await.unwrap().as_deref(),
        Some("paper_presentation")
    );
}

/// A corrupt user record is an error, not a missing user
#[tokio::test]
async fn test_corrupt_user_record() {
    let durable = MemoryStore::new();
    durable.set(keys::USER, "{oops").await.unwrap();

    let ts = test_session_with(durable).await;
    assert!(ts.session.current_user().await.is_err());
}
