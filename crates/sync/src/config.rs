//! Sync configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (REST adapter only)
//! - `CARTWHEEL_API_BASE_URL` - Base URL of the cart/wishlist API
//! - `CARTWHEEL_API_TOKEN` - Bearer token for the API
//!
//! ## Optional
//! - `CARTWHEEL_API_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `CARTWHEEL_SNAPSHOT_DIR` - Directory for guest snapshots
//!   (default: `.cartwheel`)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default guest snapshot directory.
pub const DEFAULT_SNAPSHOT_DIR: &str = ".cartwheel";

const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full sync configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote API configuration.
    pub api: ApiConfig,
    /// Directory holding guest snapshot files.
    pub snapshot_dir: PathBuf,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::from_env()?,
            snapshot_dir: snapshot_dir_from_env(),
        })
    }
}

/// Remote API connection configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the cart/wishlist API.
    pub base_url: Url,
    /// Bearer token.
    pub access_token: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load the API configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url("CARTWHEEL_API_BASE_URL", &require_env("CARTWHEEL_API_BASE_URL")?)?;
        let access_token = SecretString::from(require_env("CARTWHEEL_API_TOKEN")?);
        let timeout = match env::var("CARTWHEEL_API_TIMEOUT_SECS") {
            Ok(value) => parse_timeout("CARTWHEEL_API_TIMEOUT_SECS", &value)?,
            Err(_) => Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            access_token,
            timeout,
        })
    }
}

/// The snapshot directory, from the environment or the default.
#[must_use]
pub fn snapshot_dir_from_env() -> PathBuf {
    env::var("CARTWHEEL_SNAPSHOT_DIR")
        .map_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_DIR), PathBuf::from)
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_base_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme: {other}"),
        )),
    }
}

fn parse_timeout(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(name.to_string(), value.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "timeout must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_accepts_http_and_https() {
        assert!(parse_base_url("VAR", "https://api.example.com").is_ok());
        assert!(parse_base_url("VAR", "http://localhost:8080/v1").is_ok());
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("VAR", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("VAR", "not a url").is_err());
    }

    #[test]
    fn test_parse_timeout_rejects_zero_and_garbage() {
        assert!(parse_timeout("VAR", "0").is_err());
        assert!(parse_timeout("VAR", "ten").is_err());
        assert_eq!(parse_timeout("VAR", "30").unwrap(), Duration::from_secs(30));
    }
}
