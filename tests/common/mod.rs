#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use skasc_client::components::session::{LoggingNavigator, Session};
use skasc_client::components::storage::{KeyValueStore, MemoryStore};
use skasc_client::components::ApiClient;
use std::sync::{Arc, Mutex};

pub const LOGIN_PAGE: &str = "/auth/login.html";

/// One request as the mock server saw it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct MockState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// In-process stand-in for the event manager API
pub struct MockApi {
    pub base_url: String,
    state: MockState,
}

impl MockApi {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> SeenRequest {
        self.requests().last().cloned().expect("no request reached the mock")
    }
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

fn text_response(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}

fn auth_body(name: &str) -> Value {
    json!({
        "message": "ok",
        "token": "token-1-0123456789abcdef",
        "user": {"id": 1, "email": "priya@skasc.ac.in", "name": name, "college": "SKASC"}
    })
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body = String::from_utf8_lossy(&body).to_string();
    let path = uri.path().to_string();

    state.seen.lock().unwrap().push(SeenRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    match path.as_str() {
        "/api/auth/register" => {
            if payload["name"] == "NoToken" {
                json_response(StatusCode::CREATED, json!({"message": "pending approval"}))
            } else {
                let name = payload["name"].as_str().unwrap_or_default().to_string();
                json_response(StatusCode::CREATED, auth_body(&name))
            }
        }
        "/api/auth/login" => {
            if payload["password"] == "secret" {
                json_response(StatusCode::OK, auth_body("Priya"))
            } else {
                json_response(StatusCode::UNAUTHORIZED, json!({"error": "Invalid credentials"}))
            }
        }
        "/api/status/400-error" => {
            json_response(StatusCode::BAD_REQUEST, json!({"error": "X", "details": "ignored"}))
        }
        "/api/status/500-details" => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "", "details": "Y"}),
        ),
        "/api/status/404-plain" => {
            json_response(StatusCode::NOT_FOUND, json!({"message": "nothing here"}))
        }
        "/api/status/401" => {
            json_response(StatusCode::UNAUTHORIZED, json!({"error": "Invalid token"}))
        }
        "/api/status/401-html" => text_response(StatusCode::UNAUTHORIZED, "<h1>nope</h1>"),
        "/api/status/200-html" => text_response(StatusCode::OK, "<html>ok</html>"),
        "/api/status/502-html" => text_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
        _ => json_response(
            StatusCode::OK,
            json!({"method": method.to_string(), "path": path, "received": payload}),
        ),
    }
}

/// Start the mock API on an ephemeral port
pub async fn spawn_mock_api() -> MockApi {
    let state = MockState::default();
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// Session over memory stores, with handles on everything for assertions
pub struct TestSession {
    pub session: Arc<Session>,
    pub durable: MemoryStore,
    pub transient: MemoryStore,
    pub navigator: Arc<LoggingNavigator>,
}

pub async fn test_session() -> TestSession {
    test_session_with(MemoryStore::new()).await
}

pub async fn test_session_with(durable: MemoryStore) -> TestSession {
    let transient = MemoryStore::new();
    let navigator = Arc::new(LoggingNavigator::new());

    let durable_store: Arc<dyn KeyValueStore> = Arc::new(durable.clone());
    let transient_store: Arc<dyn KeyValueStore> = Arc::new(transient.clone());
    let session = Session::load(durable_store, transient_store, navigator.clone(), LOGIN_PAGE)
        .await
        .unwrap();

    TestSession {
        session: Arc::new(session),
        durable,
        transient,
        navigator,
    }
}

pub fn api_client(api: &MockApi, session: &TestSession) -> ApiClient {
    ApiClient::new(api.base_url.clone(), Arc::clone(&session.session))
}
