use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Body of `POST /voice/call`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub event_id: i64,
    pub college_name: String,
    pub phone_number: String,
}

/// Typed view over an auth response; every field is optional on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl AuthResponse {
    /// Read the typed view out of a raw response body
    ///
    /// Fields of the wrong type are skipped one by one, so a numeric
    /// `message` does not hide a valid `token`.
    pub fn from_value(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            message: text("message"),
            token: text("token"),
            user: body.get("user").filter(|user| !user.is_null()).cloned(),
        }
    }
}
