use crate::error::{config_error, env_error, ClientResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Default login page the client redirects to when the session is gone
pub const DEFAULT_LOGIN_PAGE: &str = "/auth/login.html";

/// Default location of the optional TOML overlay
pub const DEFAULT_OVERLAY_PATH: &str = "config/client.toml";

/// Where durable client storage lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

impl std::str::FromStr for StorageBackend {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "redis" => Ok(StorageBackend::Redis),
            other => Err(config_error(&format!("Unknown storage backend: {}", other))),
        }
    }
}

/// Main configuration structure for the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every endpoint is appended to, without trailing slash
    pub api_base_url: String,
    /// Path the navigator is sent to when credentials are missing or expired
    pub login_page: String,
    /// Durable storage backend
    pub storage_backend: StorageBackend,
    /// JSON file used by the file backend
    pub storage_path: PathBuf,
    /// Redis connection URL used by the redis backend
    pub redis_url: String,
    /// Timezone used when formatting dates for display
    pub timezone: String,
    /// Optional request timeout; the HTTP client default applies when unset
    pub request_timeout_secs: Option<u64>,
}

/// Values read from `config/client.toml`; anything present wins over env
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverlay {
    pub api_base_url: Option<String>,
    pub login_page: Option<String>,
    pub storage_backend: Option<StorageBackend>,
    pub storage_path: Option<PathBuf>,
    pub redis_url: Option<String>,
    pub timezone: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
            storage_backend: StorageBackend::File,
            storage_path: PathBuf::from(".skasc/storage.json"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            timezone: "UTC".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ClientResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::load_with_overlay(Path::new(DEFAULT_OVERLAY_PATH))
    }

    /// Load configuration from environment, then apply the overlay file if present
    pub fn load_with_overlay(overlay_path: &Path) -> ClientResult<Self> {
        let mut config = Config::default();

        if let Ok(url) = env::var("API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(page) = env::var("LOGIN_PAGE") {
            config.login_page = page;
        }
        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            config.storage_backend = backend.parse()?;
        }
        if let Ok(path) = env::var("STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }
        if let Ok(url) = env::var("REDIS_URL") {
            config.redis_url = url;
        }
        if let Ok(tz) = env::var("TIMEZONE") {
            config.timezone = tz;
        }
        if let Ok(secs) = env::var("REQUEST_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| env_error("REQUEST_TIMEOUT_SECS"))?;
            config.request_timeout_secs = Some(secs);
        }

        // Overlay file is optional; a broken one is an error
        if overlay_path.exists() {
            let content = fs::read_to_string(overlay_path)?;
            let overlay: ConfigOverlay = toml::from_str(&content)?;
            config.apply_overlay(overlay);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge overlay values over the current ones
    pub fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = overlay.login_page {
            self.login_page = v;
        }
        if let Some(v) = overlay.storage_backend {
            self.storage_backend = v;
        }
        if let Some(v) = overlay.storage_path {
            self.storage_path = v;
        }
        if let Some(v) = overlay.redis_url {
            self.redis_url = v;
        }
        if let Some(v) = overlay.timezone {
            self.timezone = v;
        }
        if overlay.request_timeout_secs.is_some() {
            self.request_timeout_secs = overlay.request_timeout_secs;
        }
    }

    /// Check the base URL and timezone, and normalize the trailing slash away
    pub fn validate(&mut self) -> ClientResult<()> {
        Url::parse(&self.api_base_url).map_err(|e| {
            config_error(&format!("Invalid API base URL {}: {}", self.api_base_url, e))
        })?;
        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }

        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))?;

        Ok(())
    }

    /// Parsed display timezone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }

    /// Save the current configuration as an overlay file
    pub fn save_overlay(&self, overlay_path: &Path) -> ClientResult<()> {
        if let Some(parent) = overlay_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let overlay = ConfigOverlay {
            api_base_url: Some(self.api_base_url.clone()),
            login_page: Some(self.login_page.clone()),
            storage_backend: Some(self.storage_backend),
            storage_path: Some(self.storage_path.clone()),
            redis_url: Some(self.redis_url.clone()),
            timezone: Some(self.timezone.clone()),
            request_timeout_secs: self.request_timeout_secs,
        };

        let toml_str = toml::to_string(&overlay)?;
        fs::write(overlay_path, toml_str)?;

        Ok(())
    }
}
