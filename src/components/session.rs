//! Client session context.
//!
//! Owns the durable and transient stores, the navigator and the cached
//! bearer token. Constructed once at start-up and passed to the API client
//! and the event cache.

use crate::components::storage::{keys, KeyValueStore};
use crate::error::ClientResult;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Moves the user somewhere else, e.g. to the login page
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Navigator that logs redirects and remembers the last target
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    last: Mutex<Option<String>>,
}

impl LoggingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last path passed to `redirect`
    pub fn last_redirect(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl Navigator for LoggingNavigator {
    fn redirect(&self, path: &str) {
        warn!("Redirecting to {}", path);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(path.to_string());
        }
    }
}

/// Shared session state
pub struct Session {
    durable: Arc<dyn KeyValueStore>,
    transient: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    login_page: String,
    token: RwLock<Option<String>>,
}

impl Session {
    /// Build a session, reading any stored token once
    pub async fn load(
        durable: Arc<dyn KeyValueStore>,
        transient: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        login_page: impl Into<String>,
    ) -> ClientResult<Self> {
        let token = durable.get(keys::TOKEN).await?;
        debug!("Session loaded, authenticated: {}", token.is_some());

        Ok(Self {
            durable,
            transient,
            navigator,
            login_page: login_page.into(),
            token: RwLock::new(token),
        })
    }

    /// Durable store (survives restarts)
    pub fn durable(&self) -> &Arc<dyn KeyValueStore> {
        &self.durable
    }

    /// Transient store (lives with the process)
    pub fn transient(&self) -> &Arc<dyn KeyValueStore> {
        &self.transient
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    /// Cached bearer token
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Persist the token and user record, then cache the token
    pub async fn store_credentials(&self, token: &str, user: &Value) -> ClientResult<()> {
        self.durable.set(keys::TOKEN, token).await?;
        self.durable
            .set(keys::USER, &serde_json::to_string(user)?)
            .await?;
        *self.token.write().await = Some(token.to_string());

        info!("Stored credentials");
        Ok(())
    }

    /// Forget the token and remove the stored credential and user record
    pub async fn clear_credentials(&self) -> ClientResult<()> {
        // Drop the cached token first so nothing reuses it if storage fails
        *self.token.write().await = None;
        self.durable.remove(keys::TOKEN).await?;
        self.durable.remove(keys::USER).await?;

        info!("Cleared credentials");
        Ok(())
    }

    /// Send the user to the login page
    pub fn redirect_to_login(&self) {
        self.navigator.redirect(&self.login_page);
    }

    /// Clear credentials and redirect to the login page
    pub async fn logout(&self) -> ClientResult<()> {
        self.clear_credentials().await?;
        self.redirect_to_login();
        Ok(())
    }

    /// Redirect to the login page and return false when no token is held
    pub async fn require_auth(&self) -> bool {
        if self.is_authenticated().await {
            return true;
        }
        self.redirect_to_login();
        false
    }

    /// Stored user record, if any
    pub async fn current_user(&self) -> ClientResult<Option<Value>> {
        match self.durable.get(keys::USER).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Event type hint used as the default for new events
    pub async fn event_type_hint(&self) -> ClientResult<Option<String>> {
        Ok(self
            .transient
            .get(keys::EVENT_TYPE)
            .await?
            .filter(|hint| !hint.is_empty()))
    }

    pub async fn set_event_type_hint(&self, event_type: &str) -> ClientResult<()> {
        self.transient.set(keys::EVENT_TYPE, event_type).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("login_page", &self.login_page)
            .finish_non_exhaustive()
    }
}
