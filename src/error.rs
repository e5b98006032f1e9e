use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the client
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Session expired. Please login again.")]
    #[diagnostic(code(skasc::session_expired), help("Log in again to get a new token"))]
    SessionExpired,

    /// Non-2xx response; displays the server's message verbatim
    #[error("{message}")]
    #[diagnostic(code(skasc::http))]
    Http { status: u16, message: String },

    #[error("Invalid server response")]
    #[diagnostic(code(skasc::invalid_response))]
    InvalidResponse,

    #[error("Network error: {0}")]
    #[diagnostic(code(skasc::transport))]
    Transport(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    #[diagnostic(code(skasc::storage))]
    Storage(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(skasc::serialization))]
    Serialization(String),

    #[error("Not found: {0}")]
    #[diagnostic(code(skasc::not_found))]
    NotFound(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(skasc::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(skasc::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(skasc::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(skasc::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ClientResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create not-found errors
pub fn not_found_error(what: &str) -> Error {
    Error::NotFound(what.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
