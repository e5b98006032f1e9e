//! HTTP client for the event manager API.
//!
//! Every call goes to `base_url + endpoint` with a JSON content type and the
//! session's bearer token when one is held. A 401 ends the session: stored
//! credentials are cleared and the navigator is sent to the login page.

pub mod models;

pub use models::{AuthResponse, CallRequest, Credentials, Registration};
pub use reqwest::Method;

use crate::components::session::Session;
use crate::config::Config;
use crate::error::{ClientResult, Error};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// API client bound to one session
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client with the default HTTP settings
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            session,
        }
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config, session: Arc<Session>) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send a request and return the parsed JSON body
    ///
    /// The body is only sent for non-GET methods. Any non-2xx status becomes
    /// an error carrying the server's `error` or `details` message, and a
    /// body that is not JSON is an error whatever the status.
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let token = self.session.token().await;

        debug!(
            "Making {} request to: {} (authorized: {})",
            method,
            url,
            token.is_some()
        );

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }

        if method != Method::GET {
            if let Some(body) = body.filter(|body| !body.is_null()) {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await.map_err(|e| {
            error!("API Error: request to {} failed: {}", url, e);
            Error::Transport(e)
        })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            warn!("Session expired on {} {}", method, endpoint);
            if let Err(e) = self.session.clear_credentials().await {
                error!("Failed to clear credentials after 401: {}", e);
            }
            self.session.redirect_to_login();
            return Err(Error::SessionExpired);
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            Error::InvalidResponse
        })?;

        let data: Value = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to parse JSON response: {}", e);
            Error::InvalidResponse
        })?;

        if !status.is_success() {
            let message = error_message(&data, status.as_u16());
            error!("API Error: {} ({})", message, status);
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(data)
    }

    async fn get(&self, endpoint: &str) -> ClientResult<Value> {
        self.request(endpoint, Method::GET, None).await
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, payload: &T) -> ClientResult<Value> {
        let body = serde_json::to_value(payload)?;
        self.request(endpoint, Method::POST, Some(&body)).await
    }

    /// Keep the token and user from an auth response, when it carries a token
    async fn remember_credentials(&self, data: &Value) -> ClientResult<()> {
        let auth = AuthResponse::from_value(data);
        let token = auth.token.filter(|token| !token.is_empty());

        if let Some(token) = token {
            let user = auth.user.unwrap_or(Value::Null);
            self.session.store_credentials(&token, &user).await?;
        }

        Ok(())
    }

    // Auth endpoints

    pub async fn register(&self, email: &str, password: &str, name: &str) -> ClientResult<Value> {
        let payload = Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };

        let data = self.post("/auth/register", &payload).await.inspect_err(|e| {
            error!("Registration failed: {}", e);
        })?;
        self.remember_credentials(&data).await?;

        info!("Registered {}", email);
        Ok(data)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Value> {
        let payload = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let data = self.post("/auth/login", &payload).await.inspect_err(|e| {
            error!("Login failed: {}", e);
        })?;
        self.remember_credentials(&data).await?;

        info!("Logged in as {}", email);
        Ok(data)
    }

    pub async fn get_current_user(&self) -> ClientResult<Value> {
        self.get("/auth/me").await
    }

    // Event endpoints

    pub async fn create_event<T: Serialize + ?Sized>(&self, event: &T) -> ClientResult<Value> {
        self.post("/events/create", event).await
    }

    pub async fn get_my_events(&self) -> ClientResult<Value> {
        self.get("/events/my-events").await
    }

    // Voice endpoints

    pub async fn initiate_call<T: Serialize + ?Sized>(&self, call: &T) -> ClientResult<Value> {
        self.post("/voice/call", call).await
    }

    // Design endpoints

    pub async fn generate_poster<T: Serialize + ?Sized>(&self, poster: &T) -> ClientResult<Value> {
        self.post("/design/poster", poster).await
    }

    pub async fn generate_certificate<T: Serialize + ?Sized>(
        &self,
        certificate: &T,
    ) -> ClientResult<Value> {
        self.post("/design/certificate", certificate).await
    }

    pub async fn download_poster(&self, poster_id: &str) -> ClientResult<Value> {
        self.get(&format!("/download/poster/{}", path_segment(poster_id)))
            .await
    }

    pub async fn download_certificate(&self, certificate_id: &str) -> ClientResult<Value> {
        self.get(&format!(
            "/download/certificate/{}",
            path_segment(certificate_id)
        ))
        .await
    }

    /// Server health probe
    pub async fn health(&self) -> ClientResult<Value> {
        self.get("/health").await
    }
}

/// Pick the human-readable message out of an error body
fn error_message(data: &Value, status: u16) -> String {
    message_field(data.get("error"))
        .or_else(|| message_field(data.get("details")))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

fn message_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
