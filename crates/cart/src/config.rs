//! Cart engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MERCATO_API_BASE_URL` - Base URL of the Mercato REST backend
//!
//! ## Optional
//! - `MERCATO_API_TOKEN` - Bearer token for an already-authenticated session
//! - `MERCATO_STORAGE_DIR` - Directory for on-device cart storage (default: .mercato)
//! - `MERCATO_HTTP_TIMEOUT_SECS` - HTTP client timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".mercato";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart engine configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Base URL of the Mercato REST backend (scheme + host, no trailing path)
    pub api_base_url: String,
    /// Bearer token for an already-authenticated session
    pub api_token: Option<SecretString>,
    /// Directory holding the on-device key-value store
    pub storage_dir: PathBuf,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_dir", &self.storage_dir)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `MERCATO_API_BASE_URL` is missing or not a
    /// valid http(s) URL, or if `MERCATO_HTTP_TIMEOUT_SECS` is not an
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url =
            validate_base_url("MERCATO_API_BASE_URL", &get_required_env("MERCATO_API_BASE_URL")?)?;
        let api_token = get_optional_env("MERCATO_API_TOKEN").map(SecretString::from);
        let storage_dir =
            PathBuf::from(get_env_or_default("MERCATO_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let http_timeout = parse_timeout(
            "MERCATO_HTTP_TIMEOUT_SECS",
            &get_env_or_default("MERCATO_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        )?;

        Ok(Self {
            api_base_url,
            api_token,
            storage_dir,
            http_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a base URL parses and uses an http(s) scheme.
fn validate_base_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.to_string())
}

/// Parse a timeout value in whole seconds.
fn parse_timeout(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
}
