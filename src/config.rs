//! Application configuration loaded from environment variables.
//!
//! The same `Config` drives both halves of the crate: the backend service
//! (port, admin credentials, JWT key) and the data-access client (API URL,
//! local storage directory, timeouts).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Backend service ---
    /// Server port
    pub port: u16,
    /// Mini-app URL allowed by CORS
    pub frontend_url: String,
    /// Admin panel login name
    pub admin_username: String,
    /// Admin panel password (also used for offline login)
    pub admin_password: String,
    /// JWT signing key for admin session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,

    // --- Data-access client ---
    /// Base URL of the council API, including the `/api` prefix
    pub api_url: String,
    /// Directory holding the local JSON collections
    pub storage_dir: PathBuf,
    /// Per-request timeout for the remote client
    pub request_timeout: Duration,
    /// Skip the remote entirely and work from local storage only
    pub local_only: bool,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "test_password".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            api_url: "http://localhost:8080/api".to_string(),
            storage_dir: PathBuf::from(".youth-council-test"),
            request_timeout: Duration::from_secs(5),
            local_only: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let request_timeout_secs: u64 = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS", raw))?,
            Err(_) => 10,
        };

        Ok(Self {
            port,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            admin_username: env::var("ADMIN_USERNAME")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ADMIN_PASSWORD"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            api_url: env::var("API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}/api", port)),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".youth-council")),
            request_timeout: Duration::from_secs(request_timeout_secs),
            local_only: env::var("LOCAL_ONLY")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
