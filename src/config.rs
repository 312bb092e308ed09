//! Configuration management for Listify.
//!
//! Configuration is read from environment variables at startup:
//! - `GEMINI_API_KEY` - Required. Credential for the generation provider.
//! - `GEMINI_MODEL` - Optional. Provider model. Defaults to `gemini-2.5-flash`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//! - `TASK_STORE` - Optional. `sqlite` (default) or `memory`.
//! - `DATA_DIR` - Optional. Directory for the SQLite file. Defaults to `./data`.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::TaskStoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider API key
    pub api_key: String,

    /// Provider model identifier
    pub model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Task store backend
    pub store_kind: TaskStoreKind,

    /// Directory for persistent storage
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GEMINI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let store_kind = std::env::var("TASK_STORE")
            .map(|s| TaskStoreKind::parse(&s))
            .unwrap_or_default();

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Ok(Self {
            api_key,
            model,
            host,
            port,
            store_kind,
            data_dir,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            host: "127.0.0.1".to_string(),
            port: 5000,
            store_kind: TaskStoreKind::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}
